use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;
use tracing::{info, debug, warn, instrument};

use super::domain::{RegisterInput, LoginInput, AuthUser, AuthSession};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::token;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl_hours: i64) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl_hours, password_algorithm: "argon2".into() }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret", 1));
    /// let input = RegisterInput { email: "user@example.com".into(), username: "user_1".into(), name: "Test".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email, username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        models::user::validate_email(&input.email)?;
        models::user::validate_username(&input.username)?;
        models::user::validate_name(&input.name)?;
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
        }
        let email = models::user::normalize_email(&input.email);
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("email taken: {}", existing.email);
            return Err(AuthError::Conflict);
        }
        if self.repo.find_user_by_username(&input.username).await?.is_some() {
            debug!("username taken: {}", input.username);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self.repo
            .create_user_with_password(&email, &input.username, &input.name, hash, self.cfg.password_algorithm.clone())
            .await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a session token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::new("secret", 1));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), username: "u_e".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = models::user::normalize_email(&input.email);
        let user = self.repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if !user.active {
            warn!(user_id = %user.id, "login attempt on deleted account");
            return Err(AuthError::Unauthorized);
        }

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let token = token::issue(&self.cfg.jwt_secret, user.id, &user.email, self.cfg.token_ttl_hours)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Decode a session token into the user id it was issued for.
    pub fn authenticate(&self, token: &str) -> Result<token::Claims, AuthError> {
        token::verify(&self.cfg.jwt_secret, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>) {
        let repo = Arc::new(MockAuthRepository::default());
        (repo.clone(), AuthService::new(repo, AuthConfig::new("test-secret", 1)))
    }

    fn reg(email: &str, username: &str) -> RegisterInput {
        RegisterInput { email: email.into(), username: username.into(), name: "Tester".into(), password: "Passw0rd!".into() }
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let (_, svc) = svc();
        let mut input = reg("a@b.io", "abc");
        input.password = "short".into();
        assert!(matches!(svc.register(input).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email_case_insensitively() {
        let (_, svc) = svc();
        svc.register(reg("a@b.io", "first")).await.unwrap();
        let err = svc.register(reg("A@B.io", "second")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let (_, svc) = svc();
        svc.register(reg("a@b.io", "taken")).await.unwrap();
        assert!(matches!(svc.register(reg("c@d.io", "taken")).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn failed_credential_write_leaves_no_user() {
        let (repo, svc) = svc();
        repo.fail_credential_writes();
        assert!(matches!(svc.register(reg("a@b.io", "abc")).await, Err(AuthError::Repository(_))));
        assert_eq!(repo.user_count(), 0);
        assert!(repo.find_user_by_email("a@b.io").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn register_stores_an_argon2_hash() {
        let (repo, svc) = svc();
        let user = svc.register(reg("a@b.io", "abc")).await.unwrap();
        let cred = repo.get_credentials(user.id).await.unwrap().unwrap();
        assert!(cred.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn login_issues_token_for_the_user() {
        let (_, svc) = svc();
        let user = svc.register(reg("a@b.io", "abc")).await.unwrap();
        let session = svc.login(LoginInput { email: "a@b.io".into(), password: "Passw0rd!".into() }).await.unwrap();
        let claims = svc.authenticate(&session.token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
    }

    #[tokio::test]
    async fn login_wrong_password_unauthorized() {
        let (_, svc) = svc();
        svc.register(reg("a@b.io", "abc")).await.unwrap();
        let err = svc.login(LoginInput { email: "a@b.io".into(), password: "nope".into() }).await.unwrap_err();
        assert_eq!(err.code(), 1004);
    }

    #[tokio::test]
    async fn login_unknown_email_unauthorized() {
        let (_, svc) = svc();
        let err = svc.login(LoginInput { email: "ghost@b.io".into(), password: "Passw0rd!".into() }).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn login_refused_for_deleted_account() {
        let (repo, svc) = svc();
        svc.register(reg("a@b.io", "abc")).await.unwrap();
        repo.deactivate("a@b.io");
        let err = svc.login(LoginInput { email: "a@b.io".into(), password: "Passw0rd!".into() }).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }
}
