use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::record::{Record, RecordMeta};
use crate::validation::{self, Validate};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Editor,
}

/// Back-office account. `password_hash` is an argon2 PHC string and never
/// leaves the service layer; see [`UserView`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Role,
    pub password_hash: String,
}

impl Record for User {
    const COLLECTION: &'static str = "users";
    fn meta(&self) -> &RecordMeta { &self.meta }
    fn meta_mut(&mut self) -> &mut RecordMeta { &mut self.meta }
}

impl Validate for User {
    fn validate(&self) -> Result<(), ModelError> {
        validation::require("username", &self.username)?;
        if self.username.len() < 3
            || !self.username.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(ModelError::invalid(
                "username must be at least 3 characters of a-z, 0-9, '_', '.', '-'",
            ));
        }
        validation::require("passwordHash", &self.password_hash)?;
        Ok(())
    }
}

/// Public projection of a [`User`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub username: String,
    pub name: String,
    pub role: Role,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self { meta: u.meta, username: u.username, name: u.name, role: u.role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_drops_password_hash() {
        let user = User {
            meta: RecordMeta::with_id("u1"),
            username: "admin".into(),
            name: "Admin".into(),
            role: Role::Admin,
            password_hash: "$argon2id$v=19$...".into(),
        };
        assert!(user.validate().is_ok());
        let v = serde_json::to_value(UserView::from(user)).unwrap();
        assert!(v.get("passwordHash").is_none());
        assert_eq!(v["role"], "admin");
    }

    #[test]
    fn username_charset() {
        let mut user = User {
            meta: RecordMeta::default(),
            username: "ad min".into(),
            name: String::new(),
            role: Role::Editor,
            password_hash: "x".into(),
        };
        assert!(user.validate().is_err());
        user.username = "ad".into();
        assert!(user.validate().is_err());
        user.username = "site.admin".into();
        assert!(user.validate().is_ok());
    }
}
