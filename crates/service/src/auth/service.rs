use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use tracing::{debug, info, instrument, warn};

use models::user::{Role, User, UserView};
use models::{RecordMeta, Validate};

use super::domain::{AuthSession, Claims, LoginInput};
use super::errors::AuthError;
use super::password::{hash_password, verify_password};
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Authenticate a user and issue a session token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::LoginInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "doc-secret-0123456789".into(), token_ttl_hours: 1 });
    /// tokio_test::block_on(svc.bootstrap_admin("admin", "Passw0rd!")).unwrap();
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "admin".into(), password: "Passw0rd!".into() })).unwrap();
    /// assert_eq!(session.user.username, "admin");
    /// assert!(svc.verify_token(&session.token).is_ok());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self
            .repo
            .find_user_by_username(input.username.trim())
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            debug!("password mismatch");
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.meta.id, "user_logged_in");
        Ok(AuthSession { user: UserView::from(user), token })
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp() as usize;
        let claims = Claims { sub: user.username.clone(), uid: user.meta.id.clone(), role: user.role, exp };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Decode and check a session token; anything invalid or expired is
    /// [`AuthError::Unauthorized`].
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "token rejected");
            AuthError::Unauthorized
        })
    }

    /// Seed the first admin account. Does nothing once any user exists.
    #[instrument(skip(self, password))]
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<Option<UserView>, AuthError> {
        if self.repo.count_users().await? > 0 {
            debug!("users present; skipping admin bootstrap");
            return Ok(None);
        }
        let user = User {
            meta: RecordMeta::default(),
            username: username.trim().to_string(),
            name: "Administrator".into(),
            role: Role::Admin,
            password_hash: hash_password(password)?,
        };
        user.validate().map_err(|e| AuthError::Validation(e.to_string()))?;
        let created = self.repo.create_user(user).await?;
        warn!(username = %created.username, "bootstrap admin account created; change its password");
        Ok(Some(UserView::from(created)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::store::StoreAuthRepository;
    use crate::storage::{MemoryBackend, RecordStore};

    fn service() -> (Arc<RecordStore>, AuthService<StoreAuthRepository>) {
        let store = RecordStore::new(MemoryBackend::new());
        let repo = Arc::new(StoreAuthRepository::new(&store));
        let svc = AuthService::new(repo, AuthConfig { jwt_secret: "unit-test-secret-0123".into(), token_ttl_hours: 1 });
        (store, svc)
    }

    #[tokio::test]
    async fn login_with_correct_password_issues_token() -> Result<(), anyhow::Error> {
        let (_, svc) = service();
        svc.bootstrap_admin("admin", "labbaik2025").await?;

        let session = svc
            .login(LoginInput { username: "admin".into(), password: "labbaik2025".into() })
            .await?;
        let claims = svc.verify_token(&session.token)?;
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.uid, session.user.meta.id);
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_unauthorized() -> Result<(), anyhow::Error> {
        let (_, svc) = service();
        svc.bootstrap_admin("admin", "labbaik2025").await?;

        let bad = svc.login(LoginInput { username: "admin".into(), password: "labbaik2024".into() }).await;
        assert!(matches!(bad, Err(AuthError::Unauthorized)));
        let ghost = svc.login(LoginInput { username: "nobody".into(), password: "labbaik2025".into() }).await;
        assert!(matches!(ghost, Err(AuthError::Unauthorized)));
        Ok(())
    }

    #[tokio::test]
    async fn stored_document_never_holds_the_plaintext() -> Result<(), anyhow::Error> {
        let (store, svc) = service();
        svc.bootstrap_admin("admin", "labbaik2025").await?;
        let users = store.collection::<User>().read_all().await?;
        assert_eq!(users.len(), 1);
        assert!(users[0].password_hash.starts_with("$argon2"));
        assert!(!serde_json::to_string(&users)?.contains("labbaik2025"));
        Ok(())
    }

    #[tokio::test]
    async fn bootstrap_only_runs_on_empty_collection() -> Result<(), anyhow::Error> {
        let (_, svc) = service();
        assert!(svc.bootstrap_admin("admin", "labbaik2025").await?.is_some());
        assert!(svc.bootstrap_admin("other", "labbaik2025").await?.is_none());
        Ok(())
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let (_, svc) = service();
        let user = User {
            meta: RecordMeta::with_id("u1"),
            username: "editor".into(),
            name: String::new(),
            role: Role::Editor,
            password_hash: String::new(),
        };
        let token = svc.issue_token(&user).unwrap();
        assert!(svc.verify_token(&format!("{token}x")).is_err());

        let other = AuthService::new(
            Arc::new(crate::auth::repository::mock::MockAuthRepository::default()),
            AuthConfig { jwt_secret: "a-different-secret-999".into(), token_ttl_hours: 1 },
        );
        assert!(matches!(other.verify_token(&token), Err(AuthError::Unauthorized)));
    }
}
