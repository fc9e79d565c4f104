//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `INTERNSHIP_REALTIME` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use internship_realtime::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Push server at {}", config.connection.url);
//! ```

mod api;
mod auth;
mod connection;
mod error;
mod notifications;
mod telemetry;

pub use api::ApiConfig;
pub use auth::AuthConfig;
pub use connection::ConnectionConfig;
pub use error::{ConfigError, ValidationError};
pub use notifications::NotificationsConfig;
pub use telemetry::{Environment, TelemetryConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// development configuration pointing at a local push server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Push server connection and reconnection policy
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Ledger retention and initial preferences
    #[serde(default)]
    pub notifications: NotificationsConfig,

    /// REST API used for history sync
    #[serde(default)]
    pub api: ApiConfig,

    /// Bearer token
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `INTERNSHIP_REALTIME` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `INTERNSHIP_REALTIME__CONNECTION__URL=wss://...` -> `connection.url = ...`
    /// - `INTERNSHIP_REALTIME__NOTIFICATIONS__RETENTION_CAP=200` -> `notifications.retention_cap = 200`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("INTERNSHIP_REALTIME")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.connection.validate(&self.telemetry.environment)?;
        self.notifications.validate()?;
        self.api.validate(self.notifications.retention_cap)?;
        self.telemetry.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.telemetry.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "INTERNSHIP_REALTIME__CONNECTION__URL",
        "INTERNSHIP_REALTIME__CONNECTION__MAX_RECONNECT_ATTEMPTS",
        "INTERNSHIP_REALTIME__NOTIFICATIONS__RETENTION_CAP",
        "INTERNSHIP_REALTIME__NOTIFICATIONS__ENABLE_DESKTOP",
        "INTERNSHIP_REALTIME__API__BASE_URL",
        "INTERNSHIP_REALTIME__AUTH__TOKEN",
        "INTERNSHIP_REALTIME__TELEMETRY__ENVIRONMENT",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.connection.max_reconnect_attempts, 5);
        assert_eq!(config.notifications.retention_cap, 100);
        assert!(!config.api.is_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("INTERNSHIP_REALTIME__CONNECTION__URL", "wss://push.example.com/socket");
        env::set_var("INTERNSHIP_REALTIME__CONNECTION__MAX_RECONNECT_ATTEMPTS", "7");
        env::set_var("INTERNSHIP_REALTIME__NOTIFICATIONS__RETENTION_CAP", "250");
        env::set_var("INTERNSHIP_REALTIME__NOTIFICATIONS__ENABLE_DESKTOP", "true");
        env::set_var("INTERNSHIP_REALTIME__API__BASE_URL", "https://api.example.com/api");
        env::set_var("INTERNSHIP_REALTIME__AUTH__TOKEN", "abc123");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.connection.url, "wss://push.example.com/socket");
        assert_eq!(config.connection.max_reconnect_attempts, 7);
        assert_eq!(config.notifications.retention_cap, 250);
        assert!(config.notifications.enable_desktop);
        assert_eq!(config.api.base_url.as_deref(), Some("https://api.example.com/api"));
        assert_eq!(config.auth.token.as_ref().unwrap().expose_secret(), "abc123");
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("INTERNSHIP_REALTIME__TELEMETRY__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        // Default push URL is plain ws://
        assert_eq!(config.validate(), Err(ValidationError::PushUrlMustBeSecure));
    }
}
