use thiserror::Error;

use crate::storage::StoreError;

/// Failures of login, token and account-seeding workflows.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid account data: {0}")]
    Validation(String),
    #[error("username already taken")]
    Conflict,
    /// Unknown user, wrong password and bad tokens all look the same.
    #[error("invalid username, password or session")]
    Unauthorized,
    #[error("password hashing failed: {0}")]
    HashError(String),
    #[error("cannot issue session token: {0}")]
    TokenError(String),
    #[error("user storage failed: {0}")]
    Repository(String),
}

impl AuthError {
    /// Code attached to server-side log lines; clients only see the status.
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 4001,
            AuthError::Conflict => 4009,
            AuthError::Unauthorized => 4010,
            AuthError::HashError(_) => 5001,
            AuthError::TokenError(_) => 5002,
            AuthError::Repository(_) => 5003,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { .. } => AuthError::Conflict,
            StoreError::MalformedRecord { .. } => AuthError::Validation(e.to_string()),
            other => AuthError::Repository(other.to_string()),
        }
    }
}
