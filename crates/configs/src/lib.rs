//! dishboard/crates/configs/src/lib.rs
//!
//! Layered configuration: development defaults, then an optional
//! `dishboard.toml`, then `DISHBOARD_*` environment variables (a `.env`
//! file is honored before the environment is read). Secrets ride in
//! `secrecy` wrappers so a Debug-print never leaks them.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// External base URL, used when building links for outbound mail.
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Root directory for locally stored image blobs.
    pub root: std::path::PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Key behind both the session cookies and the confirmation tokens.
    pub secret_key: SecretString,
    /// Confirmation-link validity in seconds.
    pub confirm_token_max_age: u64,
    /// Session-signature validity in seconds.
    pub session_ttl: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub sender: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub media: MediaConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    /// Load configuration. Every key has a development default, so a bare
    /// `cargo run` works; production overrides the secrets via the
    /// environment (`DISHBOARD__AUTH__SECRET_KEY=...`).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let raw = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.public_url", "http://127.0.0.1:8080")?
            .set_default("database.url", "postgres://localhost:5432/dishboard")?
            .set_default("database.max_connections", 5)?
            .set_default("media.root", "./data/uploads")?
            .set_default("auth.secret_key", "dev-secret-change-me")?
            .set_default("auth.confirm_token_max_age", 3600)?
            .set_default("auth.session_ttl", 60 * 60 * 24 * 30)?
            .set_default("mail.sender", "noreply@dishboard.local")?
            .add_source(config::File::with_name("dishboard").required(false))
            .add_source(config::Environment::with_prefix("DISHBOARD").separator("__"))
            .build()?;
        let app: AppConfig = raw.try_deserialize()?;
        tracing::debug!(
            host = %app.server.host,
            port = app.server.port,
            "configuration loaded"
        );
        Ok(app)
    }
}
