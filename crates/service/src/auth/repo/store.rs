use std::sync::Arc;

use models::user::User;

use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::storage::{Collection, RecordStore};

/// [`AuthRepository`] over the `users` collection of the record store.
#[derive(Clone)]
pub struct StoreAuthRepository {
    users: Collection<User>,
}

impl StoreAuthRepository {
    pub fn new(store: &Arc<RecordStore>) -> Self {
        Self { users: store.collection::<User>() }
    }
}

#[async_trait::async_trait]
impl AuthRepository for StoreAuthRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.read_all().await?;
        Ok(users.into_iter().find(|u| u.username.eq_ignore_ascii_case(username)))
    }

    async fn count_users(&self) -> Result<usize, AuthError> {
        Ok(self.users.read_all().await?.len())
    }

    async fn create_user(&self, user: User) -> Result<User, AuthError> {
        self.users
            .create_with(user, |candidate: &mut User, existing: &[User]| {
                if existing.iter().any(|u| u.username.eq_ignore_ascii_case(&candidate.username)) {
                    return Err(AuthError::Conflict);
                }
                Ok(())
            })
            .await
    }
}
