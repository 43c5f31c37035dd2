use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument};

use models::user::{Role, User, UserView};
use models::{RecordMeta, Validate};

use crate::auth::password::hash_password;
use crate::errors::ServiceError;
use crate::storage::{Collection, RecordStore};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Role,
    pub password: String,
}

/// Editable account fields. The username is fixed once created.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

/// Back-office accounts. Only [`UserView`]s leave this service.
pub struct UserService {
    users: Collection<User>,
}

impl UserService {
    pub fn new(store: &Arc<RecordStore>) -> Self {
        Self { users: store.collection::<User>() }
    }

    pub async fn list(&self) -> Result<Vec<UserView>, ServiceError> {
        Ok(self.users.read_all().await?.into_iter().map(UserView::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<UserView, ServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .map(UserView::from)
            .ok_or_else(|| ServiceError::not_found("user"))
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create(&self, input: NewUser) -> Result<UserView, ServiceError> {
        let user = User {
            meta: RecordMeta::default(),
            username: input.username.trim().to_string(),
            name: input.name,
            role: input.role,
            password_hash: hash_password(&input.password)?,
        };
        user.validate()?;
        let created = self
            .users
            .create_with(user, |candidate: &mut User, existing: &[User]| {
                if existing.iter().any(|u| u.username.eq_ignore_ascii_case(&candidate.username)) {
                    return Err(ServiceError::Conflict(format!("username {} is taken", candidate.username)));
                }
                Ok(())
            })
            .await?;
        info!(user_id = %created.meta.id, "user created");
        Ok(created.into())
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: &str, changes: UserUpdate) -> Result<UserView, ServiceError> {
        let mut patch = serde_json::Map::new();
        if let Some(name) = changes.name {
            patch.insert("name".into(), name.into());
        }
        if let Some(role) = changes.role {
            let role = serde_json::to_value(role).map_err(|e| ServiceError::Validation(e.to_string()))?;
            patch.insert("role".into(), role);
        }
        if let Some(password) = changes.password {
            patch.insert("passwordHash".into(), hash_password(&password)?.into());
        }
        let updated = self
            .users
            .update_with(id, patch, |candidate: &mut User, existing: &[User]| {
                candidate.validate()?;
                if candidate.role != Role::Admin && is_last_admin(id, existing) {
                    return Err(ServiceError::Conflict("cannot demote the last admin".into()));
                }
                Ok(())
            })
            .await?;
        Ok(updated.into())
    }

    /// Removing the only remaining admin is refused.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.users
            .transform(|mut users| {
                let Some(pos) = users.iter().position(|u| u.meta.id == id) else {
                    return Err(ServiceError::not_found("user"));
                };
                if is_last_admin(id, &users) {
                    return Err(ServiceError::Conflict("cannot delete the last admin".into()));
                }
                users.remove(pos);
                Ok(users)
            })
            .await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

/// `existing` holds the stored users, with `id` still at its old role.
fn is_last_admin(id: &str, existing: &[User]) -> bool {
    let mut admins = existing.iter().filter(|u| u.role == Role::Admin);
    match (admins.next(), admins.next()) {
        (Some(only), None) => only.meta.id == id,
        _ => false,
    }
}
