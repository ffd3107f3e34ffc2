//! Phone-possession login.
//!
//! Authentication is a single phone check against the identity lookup: the
//! caller is whoever can type a phone number that resolves to at least one
//! listing. There is no token protocol beyond the per-session id handed out
//! by the HTTP adapter.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::listing::Listing;
use crate::domain::phone;
use crate::ports::ListingStore;

/// What a login attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Input too short to be a phone number.
    InvalidPhone,
    /// No listing resolves to this identity.
    NotFound,
    /// Authenticated; the caller's listings, most recent first.
    Authenticated(Vec<Listing>),
}

/// Service backing the login surface.
pub struct LoginService {
    store: Arc<dyn ListingStore>,
}

impl LoginService {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    pub async fn login(&self, phone_input: &str) -> Result<LoginOutcome, DomainError> {
        let phone_input = phone_input.trim();
        if phone_input.len() < 6 {
            return Ok(LoginOutcome::InvalidPhone);
        }

        let listings = self
            .store
            .find_by_identity(&phone::normalize(phone_input))
            .await?;

        if listings.is_empty() {
            Ok(LoginOutcome::NotFound)
        } else {
            Ok(LoginOutcome::Authenticated(listings))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryListingStore;
    use crate::domain::listing::NewListing;

    #[tokio::test]
    async fn short_input_is_rejected_without_a_lookup() {
        let store = Arc::new(InMemoryListingStore::new());
        let service = LoginService::new(store);

        assert_eq!(service.login("123").await.unwrap(), LoginOutcome::InvalidPhone);
    }

    #[tokio::test]
    async fn unknown_phone_is_not_found() {
        let store = Arc::new(InMemoryListingStore::new());
        let service = LoginService::new(store);

        assert_eq!(service.login("9873312399").await.unwrap(), LoginOutcome::NotFound);
    }

    #[tokio::test]
    async fn known_phone_authenticates_with_listings() {
        let store = Arc::new(InMemoryListingStore::new());
        store
            .insert(NewListing {
                name: "Joe's Cafe".to_string(),
                address: "12 Elm Street".to_string(),
                phone_number: "9873312399".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let service = LoginService::new(store);
        match service.login("98733 12399").await.unwrap() {
            LoginOutcome::Authenticated(listings) => {
                assert_eq!(listings.len(), 1);
                assert_eq!(listings[0].name, "Joe's Cafe");
            }
            other => panic!("expected authentication, got {:?}", other),
        }
    }
}
