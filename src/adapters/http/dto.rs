//! Request/response DTOs for the chat endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::SessionId;
use crate::domain::listing::Listing;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session_id: SessionId,
    pub listings: Vec<ListingView>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: SessionId,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Listing fields exposed over the wire.
#[derive(Debug, Serialize)]
pub struct ListingView {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub website: String,
    pub category: String,
    pub city: String,
    pub state: String,
    pub reviews_count: i64,
    pub reviews_average: Option<f64>,
}

impl From<&Listing> for ListingView {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.as_i64(),
            name: listing.name.clone(),
            address: listing.address.clone(),
            phone_number: listing.phone_number.clone(),
            website: listing.website.clone(),
            category: listing.category.clone(),
            city: listing.city.clone(),
            state: listing.state.clone(),
            reviews_count: listing.reviews_count,
            reviews_average: listing.reviews_average,
        }
    }
}
