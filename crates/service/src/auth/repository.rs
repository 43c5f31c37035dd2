use async_trait::async_trait;

use models::user::User;

use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;
    async fn count_users(&self) -> Result<usize, AuthError>;
    /// Persist a new user; a taken username is [`AuthError::Conflict`].
    async fn create_user(&self, user: User) -> Result<User, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, User>>, // key: username
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
            let users = self.users.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            Ok(users.get(username).cloned())
        }

        async fn count_users(&self) -> Result<usize, AuthError> {
            let users = self.users.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            Ok(users.len())
        }

        async fn create_user(&self, mut user: User) -> Result<User, AuthError> {
            let mut users = self.users.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            if users.contains_key(&user.username) {
                return Err(AuthError::Conflict);
            }
            if user.meta.id.is_empty() {
                user.meta.id = crate::storage::generate_id();
            }
            users.insert(user.username.clone(), user.clone());
            Ok(user)
        }
    }
}
