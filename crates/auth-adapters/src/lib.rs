//! # auth-adapters
//!
//! Argon2-backed implementation of `CredentialVerifier`. Password material
//! never leaves this crate; the core only sees opaque success or failure.
//! Authentication errors are deliberately indistinguishable between
//! "unknown login" and "wrong password".

use std::collections::HashMap;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use domains::{AppError, CredentialVerifier, Result, UserAccount};

struct Credential {
    user_id: Uuid,
    phc_hash: String,
}

/// Credential registry keyed by login, hashes stored in PHC string format.
#[derive(Default)]
pub struct ArgonVerifier {
    users: RwLock<HashMap<String, Credential>>,
}

impl ArgonVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AppError::Internal(format!("password hashing failed: {err}")))
    }

    fn verify(password: &str, phc_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(phc_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[async_trait]
impl CredentialVerifier for ArgonVerifier {
    async fn register(&self, login: &str, password: &str) -> Result<UserAccount> {
        let phc_hash = Self::hash_password(password)?;

        let mut users = self.users.write().await;
        if users.contains_key(login) {
            return Err(AppError::Conflict(format!("login {login} is taken")));
        }
        let user_id = Uuid::now_v7();
        users.insert(login.to_string(), Credential { user_id, phc_hash });
        drop(users);

        info!(%login, "credentials registered");
        Ok(UserAccount { id: user_id, login: login.to_string() })
    }

    async fn authenticate(&self, login: &str, password: &str) -> Result<UserAccount> {
        let users = self.users.read().await;
        let verified = users
            .get(login)
            .filter(|cred| Self::verify(password, &cred.phc_hash))
            .map(|cred| UserAccount { id: cred.user_id, login: login.to_string() });

        verified.ok_or_else(|| AppError::Unauthenticated("bad login or password".into()))
    }
}
