//! Business listing model.
//!
//! Listings are owned by the storage collaborator; the core reads and writes
//! them through the fields below. There is no uniqueness constraint on phone:
//! several listings may normalize to the same identity key, so "listings for
//! a phone" is always a set, ordered most-recent-first.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::foundation::ListingId;
use super::phone;

/// Timestamp format used for `created_at`.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fields the storage update contract accepts; anything else is silently
/// dropped, not an error.
pub const UPDATABLE_FIELDS: [&str; 9] = [
    "name",
    "address",
    "phone_number",
    "website",
    "category",
    "subcategory",
    "area",
    "city",
    "state",
];

/// A stored business listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub website: String,
    pub category: String,
    pub subcategory: String,
    pub city: String,
    pub state: String,
    pub area: String,
    pub reviews_count: i64,
    pub reviews_average: Option<f64>,
    pub created_at: String,
}

impl Listing {
    /// The digit-only identity key of this listing's phone, derived at
    /// comparison time.
    pub fn identity_key(&self) -> String {
        phone::normalize(&self.phone_number)
    }
}

/// Fields collected by the add flow for a new listing. The phone number is
/// already normalized by the time it lands here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewListing {
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub website: String,
    pub category: String,
    pub subcategory: String,
    pub city: String,
    pub state: String,
    pub area: String,
}

impl NewListing {
    pub fn identity_key(&self) -> String {
        phone::normalize(&self.phone_number)
    }
}

/// Result mapping from the external search collaborator. Field names in the
/// wire payload are heterogeneous (title-or-name, rating-or-reviews_average,
/// ...), so everything arrives optional and pre-coalesced by the adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnlineListing {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<i64>,
    pub category: Option<String>,
}

/// Filters an update map down to the allow-list, trimming values and
/// normalizing a phone number at write time. Empty strings survive so that
/// fields can be cleared.
pub fn sanitize_updates(updates: &HashMap<String, String>) -> HashMap<String, String> {
    updates
        .iter()
        .filter(|(key, _)| UPDATABLE_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| {
            let cleaned = if key == "phone_number" {
                phone::normalize(value.trim())
            } else {
                value.trim().to_string()
            };
            (key.clone(), cleaned)
        })
        .collect()
}

/// Search-result ordering: rating descending with missing ratings last,
/// review count descending as the tiebreaker.
pub fn rating_order(a: &Listing, b: &Listing) -> Ordering {
    match (a.reviews_average, b.reviews_average) {
        (Some(ra), Some(rb)) => rb
            .partial_cmp(&ra)
            .unwrap_or(Ordering::Equal)
            .then(b.reviews_count.cmp(&a.reviews_count)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.reviews_count.cmp(&a.reviews_count),
    }
}

/// Identity-lookup ordering: `created_at` descending; ties and missing
/// timestamps keep store order (the sort must be stable).
pub fn created_at_desc(a: &Listing, b: &Listing) -> Ordering {
    b.created_at.cmp(&a.created_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: i64) -> Listing {
        Listing {
            id: ListingId::new(id),
            name: format!("Biz {}", id),
            address: "12 Elm Street".to_string(),
            phone_number: "9873312399".to_string(),
            website: String::new(),
            category: "Cafe".to_string(),
            subcategory: String::new(),
            city: "Mumbai".to_string(),
            state: String::new(),
            area: String::new(),
            reviews_count: 0,
            reviews_average: None,
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn identity_key_is_digit_projection() {
        let mut l = listing(1);
        l.phone_number = "98733 12399".to_string();
        assert_eq!(l.identity_key(), "9873312399");
    }

    #[test]
    fn sanitize_drops_unknown_fields_silently() {
        let mut updates = HashMap::new();
        updates.insert("name".to_string(), " New Name ".to_string());
        updates.insert("reviews_count".to_string(), "999".to_string());
        updates.insert("id".to_string(), "7".to_string());

        let cleaned = sanitize_updates(&updates);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.get("name"), Some(&"New Name".to_string()));
    }

    #[test]
    fn sanitize_normalizes_phone_at_write() {
        let mut updates = HashMap::new();
        updates.insert("phone_number".to_string(), "98733 12399".to_string());

        let cleaned = sanitize_updates(&updates);
        assert_eq!(cleaned.get("phone_number"), Some(&"9873312399".to_string()));
    }

    #[test]
    fn sanitize_keeps_empty_values_to_clear_fields() {
        let mut updates = HashMap::new();
        updates.insert("website".to_string(), "".to_string());

        let cleaned = sanitize_updates(&updates);
        assert_eq!(cleaned.get("website"), Some(&String::new()));
    }

    #[test]
    fn rating_order_puts_unrated_last() {
        let mut rated = listing(1);
        rated.reviews_average = Some(3.1);
        let unrated = listing(2);

        assert_eq!(rating_order(&rated, &unrated), Ordering::Less);
        assert_eq!(rating_order(&unrated, &rated), Ordering::Greater);
    }

    #[test]
    fn rating_order_breaks_ties_on_review_count() {
        let mut a = listing(1);
        a.reviews_average = Some(4.5);
        a.reviews_count = 10;
        let mut b = listing(2);
        b.reviews_average = Some(4.5);
        b.reviews_count = 50;

        assert_eq!(rating_order(&a, &b), Ordering::Greater);
    }

    #[test]
    fn created_at_desc_orders_recent_first() {
        let mut old = listing(1);
        old.created_at = "2023-01-01 00:00:00".to_string();
        let mut new = listing(2);
        new.created_at = "2024-06-01 00:00:00".to_string();

        assert_eq!(created_at_desc(&new, &old), Ordering::Less);
    }
}
