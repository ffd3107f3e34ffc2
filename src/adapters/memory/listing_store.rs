//! In-memory listing store.
//!
//! Backs the test suite and local development. Keeps the same contract as
//! the Postgres adapter: a secondary identity index maintained alongside
//! every insert/update, and a revision counter that keys the corpus cache.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ListingId};
use crate::domain::listing::{
    self, created_at_desc, rating_order, Listing, NewListing, CREATED_AT_FORMAT,
};
use crate::domain::spelling::CorpusSeed;
use crate::ports::{ListingStore, UpdateTarget};

#[derive(Default)]
struct Inner {
    listings: Vec<Listing>,
    /// Identity key -> listing ids, in insertion order.
    identity_index: HashMap<String, Vec<ListingId>>,
    next_id: i64,
    revision: u64,
}

impl Inner {
    fn index_insert(&mut self, identity: String, id: ListingId) {
        if identity.is_empty() {
            return;
        }
        self.identity_index.entry(identity).or_default().push(id);
    }

    fn index_remove(&mut self, identity: &str, id: ListingId) {
        if let Some(ids) = self.identity_index.get_mut(identity) {
            ids.retain(|existing| *existing != id);
            if ids.is_empty() {
                self.identity_index.remove(identity);
            }
        }
    }
}

/// In-memory implementation of [`ListingStore`].
#[derive(Default)]
pub struct InMemoryListingStore {
    inner: RwLock<Inner>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a fully-specified listing, keeping the index and revision in
    /// step. Test fixture entry point; `insert` is the production path.
    pub async fn seed(&self, listing: Listing) {
        let mut inner = self.inner.write().await;
        inner.next_id = inner.next_id.max(listing.id.as_i64());
        inner.index_insert(listing.identity_key(), listing.id);
        inner.listings.push(listing);
        inner.revision += 1;
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.listings.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.listings.is_empty()
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Vec<Listing>, DomainError> {
        if identity.is_empty() {
            return Ok(Vec::new());
        }

        let inner = self.inner.read().await;
        let ids: Vec<ListingId> = inner
            .identity_index
            .get(identity)
            .cloned()
            .unwrap_or_default();

        // Collect in store order, then a stable sort keeps that order for
        // equal or missing timestamps.
        let mut matches: Vec<Listing> = inner
            .listings
            .iter()
            .filter(|listing| ids.contains(&listing.id))
            .cloned()
            .collect();
        matches.sort_by(created_at_desc);

        Ok(matches)
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn insert(&self, new_listing: NewListing) -> Result<Option<ListingId>, DomainError> {
        let mut inner = self.inner.write().await;

        let identity = new_listing.identity_key();

        // Idempotency: identical name+address+area+city+state+identity
        // returns the existing id instead of duplicating.
        let existing = inner.listings.iter().find(|l| {
            l.name.eq_ignore_ascii_case(&new_listing.name)
                && l.address.eq_ignore_ascii_case(&new_listing.address)
                && l.area.eq_ignore_ascii_case(&new_listing.area)
                && l.city.eq_ignore_ascii_case(&new_listing.city)
                && l.state.eq_ignore_ascii_case(&new_listing.state)
                && l.identity_key() == identity
        });
        if let Some(existing) = existing {
            return Ok(Some(existing.id));
        }

        inner.next_id += 1;
        let id = ListingId::new(inner.next_id);

        let listing = Listing {
            id,
            name: new_listing.name,
            address: new_listing.address,
            phone_number: identity.clone(),
            website: new_listing.website,
            category: new_listing.category,
            subcategory: new_listing.subcategory,
            city: new_listing.city,
            state: new_listing.state,
            area: new_listing.area,
            reviews_count: 0,
            reviews_average: None,
            created_at: Utc::now().format(CREATED_AT_FORMAT).to_string(),
        };

        inner.index_insert(identity, id);
        inner.listings.push(listing);
        inner.revision += 1;

        Ok(Some(id))
    }

    async fn update(
        &self,
        target: UpdateTarget,
        updates: &HashMap<String, String>,
    ) -> Result<bool, DomainError> {
        let filtered = listing::sanitize_updates(updates);
        if filtered.is_empty() {
            return Ok(false);
        }

        let mut inner = self.inner.write().await;

        let target_ids: Vec<ListingId> = match &target {
            UpdateTarget::ById(id) => inner
                .listings
                .iter()
                .filter(|l| l.id == *id)
                .map(|l| l.id)
                .collect(),
            UpdateTarget::ByIdentity(identity) => inner
                .identity_index
                .get(identity)
                .cloned()
                .unwrap_or_default(),
        };

        if target_ids.is_empty() {
            return Ok(false);
        }

        let mut reindex: Vec<(String, String, ListingId)> = Vec::new();

        for listing in inner.listings.iter_mut() {
            if !target_ids.contains(&listing.id) {
                continue;
            }
            let old_identity = listing.identity_key();
            for (key, value) in &filtered {
                match key.as_str() {
                    "name" => listing.name = value.clone(),
                    "address" => listing.address = value.clone(),
                    "phone_number" => listing.phone_number = value.clone(),
                    "website" => listing.website = value.clone(),
                    "category" => listing.category = value.clone(),
                    "subcategory" => listing.subcategory = value.clone(),
                    "area" => listing.area = value.clone(),
                    "city" => listing.city = value.clone(),
                    "state" => listing.state = value.clone(),
                    _ => {}
                }
            }
            let new_identity = listing.identity_key();
            if new_identity != old_identity {
                reindex.push((old_identity, new_identity, listing.id));
            }
        }

        // Keep the identity index transactional with the write.
        for (old_identity, new_identity, id) in reindex {
            inner.index_remove(&old_identity, id);
            inner.index_insert(new_identity, id);
        }

        inner.revision += 1;
        Ok(true)
    }

    async fn search_keyword_location(
        &self,
        keyword: &str,
        location: &str,
        limit: usize,
    ) -> Result<Vec<Listing>, DomainError> {
        let keyword = keyword.to_lowercase();
        let location = location.to_lowercase();
        let inner = self.inner.read().await;

        let mut hits: Vec<Listing> = inner
            .listings
            .iter()
            .filter(|l| {
                (l.name.to_lowercase().contains(&keyword)
                    || l.category.to_lowercase().contains(&keyword)
                    || l.subcategory.to_lowercase().contains(&keyword))
                    && (l.city.to_lowercase().contains(&location)
                        || l.address.to_lowercase().contains(&location))
            })
            .cloned()
            .collect();
        hits.sort_by(rating_order);
        hits.truncate(limit);
        Ok(hits)
    }

    async fn search_keyword(
        &self,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<Listing>, DomainError> {
        let keyword = keyword.to_lowercase();
        let inner = self.inner.read().await;

        let mut hits: Vec<Listing> = inner
            .listings
            .iter()
            .filter(|l| {
                l.name.to_lowercase().contains(&keyword)
                    || l.category.to_lowercase().contains(&keyword)
                    || l.subcategory.to_lowercase().contains(&keyword)
            })
            .cloned()
            .collect();
        hits.sort_by(rating_order);
        hits.truncate(limit);
        Ok(hits)
    }

    async fn search_location(
        &self,
        location: &str,
        limit: usize,
    ) -> Result<Vec<Listing>, DomainError> {
        let location = location.to_lowercase();
        let inner = self.inner.read().await;

        let mut hits: Vec<Listing> = inner
            .listings
            .iter()
            .filter(|l| {
                l.city.to_lowercase().contains(&location)
                    || l.address.to_lowercase().contains(&location)
            })
            .cloned()
            .collect();
        hits.sort_by(rating_order);
        hits.truncate(limit);
        Ok(hits)
    }

    async fn search_any(&self, query: &str, limit: usize) -> Result<Vec<Listing>, DomainError> {
        let query = query.to_lowercase();
        let inner = self.inner.read().await;

        let mut hits: Vec<Listing> = inner
            .listings
            .iter()
            .filter(|l| {
                l.name.to_lowercase().contains(&query)
                    || l.category.to_lowercase().contains(&query)
                    || l.city.to_lowercase().contains(&query)
            })
            .cloned()
            .collect();
        hits.sort_by(rating_order);
        hits.truncate(limit);
        Ok(hits)
    }

    async fn corpus_version(&self) -> Result<u64, DomainError> {
        Ok(self.inner.read().await.revision)
    }

    async fn corpus_seed(&self) -> Result<CorpusSeed, DomainError> {
        let inner = self.inner.read().await;

        let mut seed = CorpusSeed::default();
        for listing in &inner.listings {
            if !listing.category.is_empty() {
                seed.categories.push(listing.category.clone());
            }
            if !listing.city.is_empty() {
                seed.cities.push(listing.city.clone());
            }
            if !listing.name.is_empty() {
                seed.names.push(listing.name.clone());
            }
        }
        Ok(seed)
    }

    async fn suggested_categories(&self, limit: usize) -> Result<Vec<String>, DomainError> {
        let inner = self.inner.read().await;

        let mut seen = Vec::new();
        for listing in &inner.listings {
            if listing.category.is_empty() {
                continue;
            }
            if !seen.contains(&listing.category) {
                seen.push(listing.category.clone());
            }
            if seen.len() >= limit {
                break;
            }
        }
        Ok(seen)
    }
}
