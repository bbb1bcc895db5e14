//! # configs
//!
//! Layered configuration: compiled defaults, then `.env`, then
//! `FERRIT__`-prefixed environment variables (`__` separates sections,
//! e.g. `FERRIT__SESSION__TTL_SECS=3600`).

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    /// tracing-subscriber EnvFilter directive, e.g. "info" or "services=debug"
    pub log_filter: String,
    pub session: SessionSettings,
    pub bootstrap: BootstrapSettings,
}

#[derive(Debug, Deserialize)]
pub struct SessionSettings {
    /// Fixed session TTL in seconds from issuance.
    pub ttl_secs: i64,
}

/// Account created at startup so a fresh deployment is usable immediately.
#[derive(Debug, Deserialize)]
pub struct BootstrapSettings {
    pub login: String,
    pub password: SecretString,
}

pub fn load() -> Result<Settings, SettingsError> {
    dotenvy::dotenv().ok();

    let raw = config::Config::builder()
        .set_default("log_filter", "info")?
        .set_default("session.ttl_secs", 86_400_i64)?
        .set_default("bootstrap.login", "admin")?
        .set_default("bootstrap.password", "change-me")?
        .add_source(config::Environment::with_prefix("FERRIT").separator("__"))
        .build()?;

    let settings: Settings = raw.try_deserialize()?;
    debug!(ttl_secs = settings.session.ttl_secs, "configuration loaded");
    Ok(settings)
}
