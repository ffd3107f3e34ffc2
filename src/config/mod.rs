//! Application configuration module.
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `LISTING_DESK` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use listing_desk::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod online_search;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use online_search::OnlineSearchConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment).
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection).
    pub database: DatabaseConfig,

    /// Online search collaborator configuration.
    #[serde(default)]
    pub online_search: OnlineSearchConfig,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// - `LISTING_DESK__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `LISTING_DESK__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// A `.env` file is read first when present (development).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LISTING_DESK")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.online_search.validate(self.server.is_production())?;
        Ok(())
    }
}
