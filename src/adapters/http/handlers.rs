//! HTTP handlers for the login and chat endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tokio::sync::Mutex;

use crate::application::{FlowEngine, LoginOutcome, LoginService};
use crate::domain::conversation::ConversationState;
use crate::domain::foundation::SessionId;

use super::dto::{
    ChatRequest, ChatResponse, ErrorResponse, ListingView, LoginRequest, LoginResponse,
};

/// One authenticated session: the phone it logged in with and its
/// conversation state.
pub struct SessionEntry {
    pub phone: String,
    pub state: ConversationState,
}

/// Shared application state for the chat endpoints.
///
/// Sessions live behind per-session locks so one session's turn never blocks
/// another's; the outer map lock is held only for lookup/insert.
#[derive(Clone)]
pub struct ChatAppState {
    pub login: Arc<LoginService>,
    pub engine: Arc<FlowEngine>,
    pub sessions: Arc<Mutex<HashMap<SessionId, Arc<Mutex<SessionEntry>>>>>,
}

impl ChatAppState {
    pub fn new(login: Arc<LoginService>, engine: Arc<FlowEngine>) -> Self {
        Self {
            login,
            engine,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// POST /api/login - authenticate by phone possession.
pub async fn login(
    State(state): State<ChatAppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    match state.login.login(&request.phone).await {
        Ok(LoginOutcome::InvalidPhone) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Please enter a valid phone number",
        )
        .into_response(),
        Ok(LoginOutcome::NotFound) => error_response(
            StatusCode::NOT_FOUND,
            "No businesses found for this phone number",
        )
        .into_response(),
        Ok(LoginOutcome::Authenticated(listings)) => {
            let session_id = SessionId::new();
            let entry = SessionEntry {
                phone: request.phone.trim().to_string(),
                state: ConversationState::new(),
            };
            state
                .sessions
                .lock()
                .await
                .insert(session_id, Arc::new(Mutex::new(entry)));

            tracing::debug!(%session_id, "session opened");

            let views = listings.iter().map(ListingView::from).collect();
            (
                StatusCode::OK,
                Json(LoginResponse {
                    session_id,
                    listings: views,
                }),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "login failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response()
        }
    }
}

/// POST /api/chat - one utterance in, one reply out.
pub async fn chat(
    State(state): State<ChatAppState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    let session = {
        let sessions = state.sessions.lock().await;
        sessions.get(&request.session_id).cloned()
    };

    let Some(session) = session else {
        return error_response(StatusCode::UNAUTHORIZED, "Unknown session").into_response();
    };

    let mut entry = session.lock().await;
    let reply = state
        .engine
        .handle_turn(&mut entry.state, &request.message)
        .await;

    (StatusCode::OK, Json(ChatResponse { reply })).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapters::memory::InMemoryListingStore;
    use crate::domain::listing::{NewListing, OnlineListing};
    use crate::ports::{ListingStore, OnlineResultRanker, OnlineSearch};
    use async_trait::async_trait;

    struct NoOnline;

    #[async_trait]
    impl OnlineSearch for NoOnline {
        async fn search(
            &self,
            _query: &str,
        ) -> Result<Vec<OnlineListing>, crate::domain::foundation::DomainError> {
            Ok(vec![])
        }
    }

    struct NoRank;

    impl OnlineResultRanker for NoRank {
        fn rank(&self, results: Vec<OnlineListing>) -> Vec<OnlineListing> {
            results
        }
    }

    async fn app_state() -> ChatAppState {
        let store = Arc::new(InMemoryListingStore::new());
        store
            .insert(NewListing {
                name: "Joe's Cafe".to_string(),
                address: "12 Elm Street".to_string(),
                phone_number: "9873312399".to_string(),
                category: "Cafe".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let engine = Arc::new(FlowEngine::new(
            store.clone(),
            Arc::new(NoOnline),
            Arc::new(NoRank),
        ));
        ChatAppState::new(Arc::new(LoginService::new(store)), engine)
    }

    #[tokio::test]
    async fn login_then_chat_round_trip() {
        let state = app_state().await;

        let login_result = state.login.login("9873312399").await.unwrap();
        let LoginOutcome::Authenticated(_) = login_result else {
            panic!("expected authentication");
        };

        let session_id = SessionId::new();
        state.sessions.lock().await.insert(
            session_id,
            Arc::new(Mutex::new(SessionEntry {
                phone: "9873312399".to_string(),
                state: ConversationState::new(),
            })),
        );

        let session = {
            let sessions = state.sessions.lock().await;
            sessions.get(&session_id).cloned().expect("session stored")
        };
        let mut entry = session.lock().await;
        let reply = state.engine.handle_turn(&mut entry.state, "hi").await;
        assert!(reply.contains("Search for a business"));
    }

    #[tokio::test]
    async fn sessions_do_not_share_conversation_state() {
        let state = app_state().await;

        let a = Arc::new(Mutex::new(SessionEntry {
            phone: "9873312399".to_string(),
            state: ConversationState::new(),
        }));
        let b = Arc::new(Mutex::new(SessionEntry {
            phone: "9873312399".to_string(),
            state: ConversationState::new(),
        }));

        let mut entry_a = a.lock().await;
        state
            .engine
            .handle_turn(&mut entry_a.state, "update my business")
            .await;

        let entry_b = b.lock().await;
        assert!(!entry_b.state.is_active());
        assert!(entry_a.state.is_active());
    }
}
