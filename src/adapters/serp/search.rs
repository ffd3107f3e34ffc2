//! SerpApi client for the online search collaborator.
//!
//! Fetches Google local results for a free-text query and coalesces the
//! provider's heterogeneous field names (title-or-name, rating, reviews,
//! type-or-category) into [`OnlineListing`]. No timeout or retry policy is
//! layered on top; errors are reported to the flow boundary as text.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::domain::foundation::DomainError;
use crate::domain::listing::OnlineListing;
use crate::ports::OnlineSearch;

const DEFAULT_ENDPOINT: &str = "https://serpapi.com/search";

/// SerpApi-backed implementation of [`OnlineSearch`].
pub struct SerpApiSearch {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
}

impl SerpApiSearch {
    pub fn new(api_key: SecretString) -> Self {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT.to_string())
    }

    pub fn with_endpoint(api_key: SecretString, endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint,
        }
    }
}

#[async_trait]
impl OnlineSearch for SerpApiSearch {
    async fn search(&self, query: &str) -> Result<Vec<OnlineListing>, DomainError> {
        tracing::debug!(query, "online search request");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("engine", "google_local"),
                ("q", query),
                ("api_key", self.api_key.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::online_search(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "online search returned an error status");
            return Err(DomainError::online_search(format!(
                "provider returned {}",
                status
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| DomainError::online_search(format!("invalid response body: {}", e)))?;

        let results = payload
            .get("local_results")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(parse_result).collect())
            .unwrap_or_default();

        Ok(results)
    }
}

/// Coalesces one provider result mapping into an [`OnlineListing`].
fn parse_result(entry: &Value) -> OnlineListing {
    let text = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .find_map(|k| entry.get(k).and_then(Value::as_str))
            .map(str::to_string)
    };
    let number = |keys: &[&str]| -> Option<f64> {
        keys.iter().find_map(|k| entry.get(k).and_then(Value::as_f64))
    };

    OnlineListing {
        name: text(&["title", "name"]),
        address: text(&["address"]),
        phone: text(&["phone", "phone_number"]),
        rating: number(&["rating", "reviews_average"]),
        reviews: keys_as_i64(entry, &["reviews", "reviews_count"]),
        category: text(&["type", "category"]),
    }
}

fn keys_as_i64(entry: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|k| entry.get(k).and_then(Value::as_i64))
}
