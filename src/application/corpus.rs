//! Version-keyed cache of the spelling-correction corpus.
//!
//! The corpus is derived from current store contents. Rather than rebuilding
//! it on every correction call, it is cached and invalidated whenever the
//! store's revision counter moves (every insert/update bumps it).

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::domain::spelling::SearchCorpus;
use crate::ports::ListingStore;

/// Invalidate-on-write cache in front of [`ListingStore::corpus_seed`].
pub struct CorpusCache {
    store: Arc<dyn ListingStore>,
    cached: RwLock<Option<(u64, Arc<SearchCorpus>)>>,
}

impl CorpusCache {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self {
            store,
            cached: RwLock::new(None),
        }
    }

    /// The corpus for the store's current revision, rebuilt only when the
    /// revision has moved since the last call.
    pub async fn current(&self) -> Result<Arc<SearchCorpus>, DomainError> {
        let version = self.store.corpus_version().await?;

        if let Some((cached_version, corpus)) = self.cached.read().await.as_ref() {
            if *cached_version == version {
                return Ok(Arc::clone(corpus));
            }
        }

        let seed = self.store.corpus_seed().await?;
        let corpus = Arc::new(SearchCorpus::from_seed(&seed));

        let mut slot = self.cached.write().await;
        *slot = Some((version, Arc::clone(&corpus)));

        Ok(corpus)
    }
}
