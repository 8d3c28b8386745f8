use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError>;
    /// Insert the user row and its credentials together; neither is stored if either write fails.
    async fn create_user_with_password(&self, email: &str, username: &str, name: &str, password_hash: String, password_algorithm: String) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: email
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
        fail_credentials: AtomicBool,
    }

    impl MockAuthRepository {
        /// Flip a stored user to inactive, as a soft delete would.
        pub fn deactivate(&self, email: &str) {
            if let Some(u) = self.users.lock().unwrap().get_mut(email) {
                u.active = false;
            }
        }

        /// Make every later credential write fail.
        pub fn fail_credential_writes(&self) {
            self.fail_credentials.store(true, Ordering::SeqCst);
        }

        pub fn user_count(&self) -> usize {
            self.users.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.username == username).cloned())
        }

        async fn create_user_with_password(&self, email: &str, username: &str, name: &str, password_hash: String, password_algorithm: String) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(email) {
                return Err(AuthError::Conflict);
            }
            if self.fail_credentials.load(Ordering::SeqCst) {
                return Err(AuthError::Repository("credential write failed".into()));
            }
            let user = AuthUser { id: Uuid::new_v4(), email: email.to_string(), username: username.to_string(), name: name.to_string(), active: true };
            let c = Credentials { user_id: user.id, password_hash, password_algorithm };
            self.creds.lock().unwrap().insert(user.id, c);
            users.insert(email.to_string(), user.clone());
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }
    }
}
