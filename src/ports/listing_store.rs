//! Listing storage collaborator port.
//!
//! The store owns the listings table; the core only reads and writes through
//! this contract. Identity matching is exact (no partial or LIKE semantics at
//! the identity layer) and implementations maintain a secondary index keyed
//! by the normalized phone, updated transactionally alongside insert/update.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ListingId};
use crate::domain::listing::{Listing, NewListing};
use crate::domain::spelling::CorpusSeed;

/// Which record(s) an update addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateTarget {
    ById(ListingId),
    ByIdentity(String),
}

/// Storage contract for business listings.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// All listings whose phone normalizes to `identity`, ordered by
    /// `created_at` descending; ties and missing timestamps keep store order.
    async fn find_by_identity(&self, identity: &str) -> Result<Vec<Listing>, DomainError>;

    /// Single listing by its primary key.
    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, DomainError>;

    /// Inserts a new listing and returns its id.
    ///
    /// Idempotent on the exact name+address+area+city+state+identity-key
    /// tuple: re-submitting identical data returns the existing id rather
    /// than duplicating.
    async fn insert(&self, listing: NewListing) -> Result<Option<ListingId>, DomainError>;

    /// Updates the targeted listing(s) with the given field map.
    ///
    /// Restricted to the updatable-field allow-list; unknown fields are
    /// silently dropped. Returns whether any record was changed.
    async fn update(
        &self,
        target: UpdateTarget,
        updates: &HashMap<String, String>,
    ) -> Result<bool, DomainError>;

    /// Keyword in name/category/subcategory AND location in city/address,
    /// case-insensitive contains, rating order, at most `limit`.
    async fn search_keyword_location(
        &self,
        keyword: &str,
        location: &str,
        limit: usize,
    ) -> Result<Vec<Listing>, DomainError>;

    /// Keyword in name/category/subcategory only.
    async fn search_keyword(&self, keyword: &str, limit: usize)
        -> Result<Vec<Listing>, DomainError>;

    /// Location in city/address only.
    async fn search_location(
        &self,
        location: &str,
        limit: usize,
    ) -> Result<Vec<Listing>, DomainError>;

    /// Raw query against name/category/city.
    async fn search_any(&self, query: &str, limit: usize) -> Result<Vec<Listing>, DomainError>;

    /// Monotonic revision counter, bumped on every insert/update. Keys the
    /// spell-correction corpus cache.
    async fn corpus_version(&self) -> Result<u64, DomainError>;

    /// Distinct non-empty categories, cities, and names for corpus building.
    async fn corpus_seed(&self) -> Result<CorpusSeed, DomainError>;

    /// Distinct non-empty categories for the empty-search suggestion prompt.
    async fn suggested_categories(&self, limit: usize) -> Result<Vec<String>, DomainError>;
}
