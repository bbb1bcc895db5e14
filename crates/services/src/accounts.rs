//! Account orchestration: credentials in, sessions out. Registration makes
//! the user known to the directory before any post or vote can reference
//! them; login re-registers idempotently so pre-seeded accounts work too.

use std::sync::Arc;

use tracing::info;

use domains::{
    AppError, CredentialVerifier, Result, Session, SessionStore, UserDirectory,
};

pub struct AccountService {
    verifier: Arc<dyn CredentialVerifier>,
    directory: Arc<dyn UserDirectory>,
    sessions: Arc<dyn SessionStore>,
}

impl AccountService {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        directory: Arc<dyn UserDirectory>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self { verifier, directory, sessions }
    }

    fn check_credentials(login: &str, password: &str) -> Result<()> {
        if login.trim().is_empty() {
            return Err(AppError::Validation("login must not be empty".into()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("password must not be empty".into()));
        }
        Ok(())
    }

    /// Registers a new account and logs it in immediately.
    pub async fn register(&self, login: &str, password: &str) -> Result<Session> {
        Self::check_credentials(login, password)?;
        let account = self.verifier.register(login, password).await?;
        self.directory.register_user(account.id, &account.login).await?;

        info!(login = %account.login, "account registered");
        self.sessions.issue(account.id, &account.login).await
    }

    pub async fn login(&self, login: &str, password: &str) -> Result<Session> {
        Self::check_credentials(login, password)?;
        let account = self.verifier.authenticate(login, password).await?;
        // idempotent; covers accounts created outside this service
        self.directory.register_user(account.id, &account.login).await?;

        info!(login = %account.login, "user logged in");
        self.sessions.issue(account.id, &account.login).await
    }

    /// Resolves a presented token to its session, or `Unauthenticated`.
    pub async fn authenticate_token(&self, token: &str) -> Result<Session> {
        self.sessions.validate(token).await
    }

    /// Explicit logout; unknown tokens succeed silently.
    pub async fn logout(&self, token: &str) -> Result<()> {
        self.sessions.revoke(token).await
    }
}
