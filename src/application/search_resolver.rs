//! Tiered local search resolution.
//!
//! Parses the query into keyword/location, spell-corrects both against the
//! live corpus, then walks the search tiers until one produces results:
//! keyword+location, keyword only, location only, then the raw uncorrected
//! query. An empty outcome means the caller escalates to the online
//! collaborator.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::query;
use crate::domain::spelling::{self, DEFAULT_THRESHOLD};
use crate::domain::listing::Listing;
use crate::ports::ListingStore;

use super::corpus::CorpusCache;

/// Every tier is capped at this many results, rating-ordered.
pub const RESULT_LIMIT: usize = 5;

/// Outcome of a resolution attempt.
#[derive(Debug, Clone)]
pub struct ResolvedSearch {
    pub results: Vec<Listing>,
    pub keyword: String,
    pub location: String,
    pub was_corrected: bool,
}

/// Resolves free-text queries against the listings store.
pub struct SearchResolver {
    store: Arc<dyn ListingStore>,
    corpus: Arc<CorpusCache>,
}

impl SearchResolver {
    pub fn new(store: Arc<dyn ListingStore>, corpus: Arc<CorpusCache>) -> Self {
        Self { store, corpus }
    }

    /// Runs the tier ladder for `query`.
    pub async fn resolve(&self, raw_query: &str) -> Result<ResolvedSearch, DomainError> {
        let parsed = query::parse(raw_query);
        let corpus = self.corpus.current().await?;

        let mut keyword = parsed.keyword;
        let mut location = parsed.location;
        let mut was_corrected = false;

        if !keyword.is_empty() {
            let correction = spelling::correct(&keyword, &corpus, DEFAULT_THRESHOLD);
            if correction.was_corrected {
                keyword = correction.result;
                was_corrected = true;
            }
        }

        if !location.is_empty() {
            let correction = spelling::correct(&location, &corpus, DEFAULT_THRESHOLD);
            if correction.was_corrected {
                location = correction.result;
                was_corrected = true;
            }
        }

        let mut results = Vec::new();

        if !keyword.is_empty() && !location.is_empty() {
            results = self
                .store
                .search_keyword_location(&keyword, &location, RESULT_LIMIT)
                .await?;
        }

        if results.is_empty() && !keyword.is_empty() {
            results = self.store.search_keyword(&keyword, RESULT_LIMIT).await?;
        }

        if results.is_empty() && !location.is_empty() {
            results = self.store.search_location(&location, RESULT_LIMIT).await?;
        }

        if results.is_empty() {
            // Last local tier runs the raw query as typed, corrections and all
            // parsing aside.
            results = self.store.search_any(raw_query, RESULT_LIMIT).await?;
        }

        Ok(ResolvedSearch {
            results,
            keyword,
            location,
            was_corrected,
        })
    }

    /// Close-match suggestions for a query that found nothing anywhere.
    pub async fn suggestions_for(&self, raw_query: &str) -> Result<Vec<String>, DomainError> {
        let corpus = self.corpus.current().await?;
        Ok(spelling::correct(raw_query, &corpus, DEFAULT_THRESHOLD).suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryListingStore;
    use crate::domain::foundation::ListingId;

    fn seed_listing(id: i64, name: &str, category: &str, city: &str) -> Listing {
        Listing {
            id: ListingId::new(id),
            name: name.to_string(),
            address: format!("{} Main Road", id),
            phone_number: "9873312399".to_string(),
            website: String::new(),
            category: category.to_string(),
            subcategory: String::new(),
            city: city.to_string(),
            state: String::new(),
            area: String::new(),
            reviews_count: 10,
            reviews_average: Some(4.0),
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    async fn resolver_over(listings: Vec<Listing>) -> SearchResolver {
        let store = Arc::new(InMemoryListingStore::new());
        for listing in listings {
            store.seed(listing).await;
        }
        let corpus = Arc::new(CorpusCache::new(store.clone()));
        SearchResolver::new(store, corpus)
    }

    #[tokio::test]
    async fn keyword_and_location_hit_the_first_tier() {
        let resolver = resolver_over(vec![
            seed_listing(1, "Slice House", "Pizza", "Mumbai"),
            seed_listing(2, "Slice House", "Pizza", "Delhi"),
        ])
        .await;

        let resolved = resolver.resolve("pizza in mumbai").await.unwrap();
        assert_eq!(resolved.results.len(), 1);
        assert_eq!(resolved.results[0].city, "Mumbai");
        assert!(!resolved.was_corrected);
    }

    #[tokio::test]
    async fn missing_location_falls_back_to_keyword_tier() {
        // A pizza listing exists, but in a different city than asked.
        let resolver = resolver_over(vec![seed_listing(1, "Slice House", "Pizza", "Delhi")]).await;

        let resolved = resolver.resolve("pizza mumbai").await.unwrap();
        assert_eq!(resolved.results.len(), 1);
        assert_eq!(resolved.results[0].category, "Pizza");
    }

    #[tokio::test]
    async fn bare_city_query_still_finds_listings() {
        let resolver = resolver_over(vec![seed_listing(1, "Slice House", "Pizza", "Mumbai")]).await;

        let resolved = resolver.resolve("mumbai").await.unwrap();
        assert_eq!(resolved.results.len(), 1);
    }

    #[tokio::test]
    async fn misspelled_keyword_is_corrected_before_searching() {
        let resolver =
            resolver_over(vec![seed_listing(1, "Harbor View", "Restaurant", "Mumbai")]).await;

        let resolved = resolver.resolve("restarant mumbai").await.unwrap();
        assert!(resolved.was_corrected);
        assert_eq!(resolved.keyword, "restaurant");
        assert_eq!(resolved.results.len(), 1);
    }

    #[tokio::test]
    async fn empty_outcome_when_no_tier_matches() {
        let resolver = resolver_over(vec![seed_listing(1, "Slice House", "Pizza", "Mumbai")]).await;

        let resolved = resolver.resolve("plumber pune").await.unwrap();
        assert!(resolved.results.is_empty());
    }

    #[tokio::test]
    async fn results_are_capped_at_the_limit() {
        let listings = (1..=8)
            .map(|i| seed_listing(i, &format!("Pizza Place {}", i), "Pizza", "Mumbai"))
            .collect();
        let resolver = resolver_over(listings).await;

        let resolved = resolver.resolve("pizza mumbai").await.unwrap();
        assert_eq!(resolved.results.len(), RESULT_LIMIT);
    }
}
