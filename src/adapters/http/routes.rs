//! Axum routes for the chat endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{chat, login, ChatAppState};

/// Creates the chat routes.
///
/// - POST /api/login - authenticate by phone, returns a session id
/// - POST /api/chat - one utterance in, one formatted reply out
pub fn chat_router() -> Router<ChatAppState> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/chat", post(chat))
}
