//! HTTP session boundary.
//!
//! One free-text line in, one formatted markdown block out, per turn. Login
//! hands out a session id; each session owns exactly one conversation state.

mod dto;
mod handlers;
mod routes;

pub use dto::{ChatRequest, ChatResponse, ErrorResponse, ListingView, LoginRequest, LoginResponse};
pub use handlers::{ChatAppState, SessionEntry};
pub use routes::chat_router;
