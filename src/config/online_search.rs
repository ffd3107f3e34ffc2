//! Online search collaborator configuration.

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for the online search provider.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OnlineSearchConfig {
    /// Provider API key. Required in production; without it the online
    /// escalation tier reports failures as text.
    pub api_key: Option<SecretString>,

    /// Override for the provider endpoint (tests, proxies).
    pub endpoint: Option<String>,
}

impl OnlineSearchConfig {
    pub fn validate(&self, is_production: bool) -> Result<(), ValidationError> {
        if is_production && self.api_key.is_none() {
            return Err(ValidationError::MissingRequired("ONLINE_SEARCH_API_KEY"));
        }
        Ok(())
    }
}
