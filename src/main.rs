//! Listing Desk server entrypoint.
//!
//! Loads configuration, connects the Postgres-backed listing store, wires
//! the flow engine with the online search collaborator, and serves the chat
//! endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use listing_desk::adapters::http::{chat_router, ChatAppState};
use listing_desk::adapters::postgres::PostgresListingStore;
use listing_desk::adapters::serp::{RatingRanker, SerpApiSearch};
use listing_desk::application::{FlowEngine, LoginService};
use listing_desk::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("running migrations");
        sqlx::migrate!().run(&pool).await?;
    }

    let store = Arc::new(PostgresListingStore::new(pool));

    // Without a configured key the provider rejects every call and the flow
    // reports online search as unavailable, which is the documented failure
    // mode outside production.
    let api_key = config
        .online_search
        .api_key
        .clone()
        .unwrap_or_else(|| SecretString::new(String::new()));
    let online: Arc<SerpApiSearch> = Arc::new(match &config.online_search.endpoint {
        Some(endpoint) => SerpApiSearch::with_endpoint(api_key, endpoint.clone()),
        None => SerpApiSearch::new(api_key),
    });

    let engine = Arc::new(FlowEngine::new(
        store.clone(),
        online,
        Arc::new(RatingRanker),
    ));
    let login = Arc::new(LoginService::new(store));

    let cors = if config.server.cors_origins_list().is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = config
            .server
            .cors_origins_list()
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = chat_router()
        .with_state(ChatAppState::new(login, engine))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors);

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "listing desk listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
