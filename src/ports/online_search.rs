//! External search collaborator ports.
//!
//! When no local tier produces results the flow escalates to an online
//! provider. The provider returns heterogeneously-named result mappings; a
//! separate ranking collaborator imposes an order before the core truncates
//! to the top results. No timeout or retry policy is imposed here; failures
//! surface as text at the flow boundary.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::listing::OnlineListing;

/// Online search provider.
#[async_trait]
pub trait OnlineSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<OnlineListing>, DomainError>;
}

/// Ranking collaborator for online results. The algorithm is the
/// collaborator's own business; the core only relies on the output order.
pub trait OnlineResultRanker: Send + Sync {
    fn rank(&self, results: Vec<OnlineListing>) -> Vec<OnlineListing>;
}
