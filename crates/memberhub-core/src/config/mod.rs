//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files layered with `MEMBERHUB__`-prefixed environment variables.

pub mod auth;
pub mod database;
pub mod logging;
pub mod server;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::server::{CorsConfig, ServerConfig};
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Longest accepted API key lifetime (100 years).
pub const MAX_KEY_EXPIRY_DAYS: i64 = 36_500;

/// Longest accepted session lifetime (10 years).
pub const MAX_SESSION_SECONDS: i64 = 10 * 365 * 86_400;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment name (`development`, `production`, ...).
    #[serde(default = "default_environment")]
    pub environment: String,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Credential settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Web session settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml`, the environment-specific overlay
    /// `config/{env}.toml` and environment variables prefixed with
    /// `MEMBERHUB__` (e.g. `MEMBERHUB__AUTH__JWT_SECRET`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .set_default("environment", env)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MEMBERHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .try_parsing(true),
            );

        let config = builder
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        app.validate()?;
        Ok(app)
    }

    /// Parse configuration from a TOML string, without file or environment
    /// layering.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must be set"));
        }
        for (name, days) in [
            ("auth.dev_expiry_days", self.auth.dev_expiry_days),
            ("auth.prod_expiry_days", self.auth.prod_expiry_days),
        ] {
            if !(1..=MAX_KEY_EXPIRY_DAYS).contains(&days) {
                return Err(AppError::configuration(format!(
                    "{name} must be between 1 and {MAX_KEY_EXPIRY_DAYS}, got {days}"
                )));
            }
        }
        for (name, seconds) in [
            ("session.duration_seconds", self.session.duration_seconds),
            (
                "session.remember_duration_seconds",
                self.session.remember_duration_seconds,
            ),
        ] {
            if !(1..=MAX_SESSION_SECONDS).contains(&seconds) {
                return Err(AppError::configuration(format!(
                    "{name} must be between 1 and {MAX_SESSION_SECONDS}, got {seconds}"
                )));
            }
        }
        let threshold = self.session.extend_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(AppError::configuration(format!(
                "session.extend_threshold must be in (0, 1], got {threshold}"
            )));
        }
        if self.session.activity_queue_capacity == 0 {
            return Err(AppError::configuration(
                "session.activity_queue_capacity must be at least 1",
            ));
        }
        if !logging::VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(AppError::configuration(format!(
                "Unknown log level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Returns `true` when running in production. Controls the `Secure`
    /// cookie attribute.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn default_environment() -> String {
    "development".to_string()
}
