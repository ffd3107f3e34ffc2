//! End-to-end conversation tests over the in-memory store.
//!
//! These drive full multi-turn sessions through the flow engine: intent
//! dispatch, guided flows, tiered search with online escalation, and the
//! phone-identity round trips between flows.

use std::sync::Arc;

use async_trait::async_trait;

use listing_desk::adapters::memory::InMemoryListingStore;
use listing_desk::application::{FlowEngine, LoginOutcome, LoginService};
use listing_desk::domain::conversation::state::FlowMode;
use listing_desk::domain::conversation::ConversationState;
use listing_desk::domain::foundation::DomainError;
use listing_desk::domain::listing::OnlineListing;
use listing_desk::domain::phone;
use listing_desk::ports::{ListingStore, OnlineResultRanker, OnlineSearch};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct FixedOnlineSearch {
    results: Vec<OnlineListing>,
}

#[async_trait]
impl OnlineSearch for FixedOnlineSearch {
    async fn search(&self, _query: &str) -> Result<Vec<OnlineListing>, DomainError> {
        Ok(self.results.clone())
    }
}

struct FailingOnlineSearch;

#[async_trait]
impl OnlineSearch for FailingOnlineSearch {
    async fn search(&self, _query: &str) -> Result<Vec<OnlineListing>, DomainError> {
        Err(DomainError::online_search("provider unreachable"))
    }
}

struct PassthroughRanker;

impl OnlineResultRanker for PassthroughRanker {
    fn rank(&self, results: Vec<OnlineListing>) -> Vec<OnlineListing> {
        results
    }
}

fn engine(store: Arc<InMemoryListingStore>) -> FlowEngine {
    FlowEngine::new(
        store,
        Arc::new(FixedOnlineSearch { results: vec![] }),
        Arc::new(PassthroughRanker),
    )
}

async fn run_turns(engine: &FlowEngine, state: &mut ConversationState, turns: &[&str]) -> String {
    let mut last = String::new();
    for turn in turns {
        last = engine.handle_turn(state, turn).await;
    }
    last
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn register_then_show_round_trip() {
    let store = Arc::new(InMemoryListingStore::new());
    let engine = engine(store.clone());
    let mut state = ConversationState::new();

    let added = run_turns(
        &engine,
        &mut state,
        &[
            "add a new business",
            "Joe's Cafe",
            "98733 12399",
            "12 Elm Street",
            "skip",
            "Cafe",
            "skip",
            "skip",
        ],
    )
    .await;
    assert!(added.contains("Business Added Successfully"));

    // The stored record is found through the identity key regardless of how
    // the phone is later typed.
    let shown = run_turns(&engine, &mut state, &["show my business", "98733-12399"]).await;
    assert!(shown.contains("Business Found"));
    assert!(shown.contains("Joe's Cafe"));
    assert!(shown.contains("9873312399"));

    let listings = store
        .find_by_identity(&phone::normalize("9873312399"))
        .await
        .unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].phone_number, "9873312399");
    assert_eq!(listings[0].website, "");
    assert_eq!(listings[0].city, "");
    assert_eq!(listings[0].state, "");
}

#[tokio::test]
async fn classification_priority_resolves_overlaps_to_search() {
    let store = Arc::new(InMemoryListingStore::new());
    let engine = engine(store);
    let mut state = ConversationState::new();

    // Contains both a search phrase and a show phrase; search must win, so
    // the reply is a search outcome rather than the show-flow phone prompt.
    let text = engine.handle_turn(&mut state, "search my business info").await;
    assert!(!text.contains("Please enter the **phone number**"));
    assert!(text.contains("No results found") || text.contains("No local results"));
}

#[tokio::test]
async fn update_website_loops_back_and_show_reflects_it() {
    let store = Arc::new(InMemoryListingStore::new());
    let engine = engine(store);
    let mut state = ConversationState::new();

    run_turns(
        &engine,
        &mut state,
        &[
            "add a new business",
            "Joe's Cafe",
            "9873312399",
            "12 Elm Street",
            "skip",
            "Cafe",
            "Mumbai",
            "skip",
        ],
    )
    .await;

    let after_edit = run_turns(
        &engine,
        &mut state,
        &[
            "update my business",
            "9873312399",
            "website",
            "https://joescafe.example",
        ],
    )
    .await;

    // Back at the field menu (not idle) with the fresh value on display.
    assert!(after_edit.contains("Successfully Updated"));
    assert!(after_edit.contains("https://joescafe.example"));
    assert_eq!(state.mode, FlowMode::Update);
    assert_eq!(state.step, 2);

    let done = engine.handle_turn(&mut state, "done").await;
    assert!(done.contains("Update complete"));
    assert_eq!(state.mode, FlowMode::Idle);

    let shown = run_turns(&engine, &mut state, &["show my business", "9873312399"]).await;
    assert!(shown.contains("https://joescafe.example"));
}

#[tokio::test]
async fn keyword_tier_falls_back_when_the_city_differs() {
    let store = Arc::new(InMemoryListingStore::new());
    let engine = engine(store.clone());

    let mut setup = ConversationState::new();
    run_turns(
        &engine,
        &mut setup,
        &[
            "add a new business",
            "Slice House",
            "9000000001",
            "4 Market Road",
            "skip",
            "Pizza",
            "Delhi",
            "skip",
        ],
    )
    .await;

    let mut state = ConversationState::new();
    let text = engine.handle_turn(&mut state, "pizza mumbai").await;

    // No pizza in mumbai; the keyword-only tier still surfaces the listing.
    assert!(text.contains("Slice House"));
    assert_eq!(state.mode, FlowMode::Idle);
}

#[tokio::test]
async fn online_escalation_invites_registration() {
    let store = Arc::new(InMemoryListingStore::new());
    let online = Arc::new(FixedOnlineSearch {
        results: vec![OnlineListing {
            name: Some("Cloud Nine Pizza".to_string()),
            address: Some("1 Sky Lane".to_string()),
            phone: Some("9111111111".to_string()),
            rating: Some(4.8),
            reviews: Some(210),
            category: Some("Pizza".to_string()),
        }],
    });
    let engine = FlowEngine::new(store, online, Arc::new(PassthroughRanker));
    let mut state = ConversationState::new();

    let text = engine.handle_turn(&mut state, "find a pizza place").await;

    assert!(text.contains("No local results found"));
    assert!(text.contains("Cloud Nine Pizza"));
    assert!(text.contains("add a new business"));
    assert_eq!(state.mode, FlowMode::Idle);
}

#[tokio::test]
async fn online_failure_is_fatal_to_the_flow_not_the_session() {
    let store = Arc::new(InMemoryListingStore::new());
    let engine = FlowEngine::new(store, Arc::new(FailingOnlineSearch), Arc::new(PassthroughRanker));
    let mut state = ConversationState::new();

    let text = engine.handle_turn(&mut state, "pizza mumbai").await;
    assert!(text.contains("provider unreachable"));
    assert_eq!(state.mode, FlowMode::Idle);

    // The session keeps working afterwards.
    let greeting = engine.handle_turn(&mut state, "hi").await;
    assert!(greeting.contains("Search for a business"));
}

#[tokio::test]
async fn cancel_aborts_any_flow_at_any_step() {
    let store = Arc::new(InMemoryListingStore::new());
    let engine = engine(store);
    let mut state = ConversationState::new();

    run_turns(
        &engine,
        &mut state,
        &["add a new business", "Joe's Cafe", "9873312399"],
    )
    .await;
    assert_eq!(state.mode, FlowMode::Add);
    assert_eq!(state.step, 3);

    let text = engine.handle_turn(&mut state, "nevermind").await;
    assert!(text.contains("cancelled"));
    assert_eq!(state.mode, FlowMode::Idle);
    assert_eq!(state.step, 0);
    assert!(state.data.is_empty());
}

#[tokio::test]
async fn login_matches_identity_across_phone_formats() {
    let store = Arc::new(InMemoryListingStore::new());
    let engine = engine(store.clone());
    let mut state = ConversationState::new();

    run_turns(
        &engine,
        &mut state,
        &[
            "add a new business",
            "Joe's Cafe",
            "9873312399",
            "12 Elm Street",
            "skip",
            "Cafe",
            "skip",
            "skip",
        ],
    )
    .await;

    let service = LoginService::new(store);
    match service.login("98733 12399").await.unwrap() {
        LoginOutcome::Authenticated(listings) => assert_eq!(listings.len(), 1),
        other => panic!("expected authentication, got {:?}", other),
    }

    // Country-code digits are part of the identity: this is someone else.
    assert_eq!(
        service.login("+91 98733 12399").await.unwrap(),
        LoginOutcome::NotFound
    );
}

#[tokio::test]
async fn multiple_listings_on_one_phone_show_the_most_recent() {
    use listing_desk::domain::foundation::ListingId;
    use listing_desk::domain::listing::Listing;

    let store = Arc::new(InMemoryListingStore::new());
    for (id, name, created_at) in [
        (1, "Old Shop", "2022-03-01 10:00:00"),
        (2, "New Shop", "2024-03-01 10:00:00"),
    ] {
        store
            .seed(Listing {
                id: ListingId::new(id),
                name: name.to_string(),
                address: "1 Road".to_string(),
                phone_number: "9873312399".to_string(),
                website: "https://example.com".to_string(),
                category: "Shop".to_string(),
                subcategory: String::new(),
                city: String::new(),
                state: String::new(),
                area: String::new(),
                reviews_count: 0,
                reviews_average: None,
                created_at: created_at.to_string(),
            })
            .await;
    }

    let engine = engine(store);
    let mut state = ConversationState::new();

    let text = run_turns(&engine, &mut state, &["show my business", "9873312399"]).await;
    assert!(text.contains("New Shop"));
    assert_eq!(
        state.current_listing.as_ref().map(|l| l.name.as_str()),
        Some("New Shop")
    );
}
