//! Database configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// PostgreSQL connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,

    /// Maximum connections allowed.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Run migrations on startup.
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE_URL"));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_urls_validate() {
        let config = DatabaseConfig {
            url: "postgres://localhost/listings".to_string(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: false,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_postgres_urls_fail() {
        let config = DatabaseConfig {
            url: "mysql://localhost/listings".to_string(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: false,
        };
        assert!(config.validate().is_err());
    }
}
