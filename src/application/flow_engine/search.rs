//! Search flow: tiered local resolution first, online escalation second.

use crate::application::search_resolver::ResolvedSearch;
use crate::domain::conversation::reply;
use crate::domain::conversation::state::ConversationState;
use crate::domain::foundation::DomainError;

use super::FlowEngine;

impl FlowEngine {
    pub(super) async fn search_step(
        &self,
        state: &mut ConversationState,
        input: &str,
    ) -> Result<String, DomainError> {
        let query = input.trim();

        if query.chars().count() < 2 {
            return Ok(
                "⚠️ Please enter what you're looking for (at least 2 characters):".to_string(),
            );
        }

        state
            .data
            .insert("search_query".to_string(), query.to_string());

        let resolved = self.resolver.resolve(query).await?;

        if !resolved.results.is_empty() {
            state.reset();
            return Ok(render_local_results(&resolved));
        }

        // No local tier matched: escalate to the online collaborator.
        state.step = 2;

        let online_query = if !resolved.keyword.is_empty() && !resolved.location.is_empty() {
            format!("{} in {}", resolved.keyword, resolved.location)
        } else if !resolved.keyword.is_empty() {
            resolved.keyword.clone()
        } else {
            query.to_string()
        };

        match self.online.search(&online_query).await {
            Ok(online_results) if !online_results.is_empty() => {
                let ranked = self.ranker.rank(online_results);
                state.reset();

                let mut text = format!("🔍 No local results found for \"{}\".\n", query);
                if !resolved.keyword.is_empty() && !resolved.location.is_empty() {
                    text.push_str(&format!(
                        "_(Searched: \"{}\" in {})_\n",
                        resolved.keyword, resolved.location
                    ));
                }
                text.push_str("\n🌐 **Here are results from online search:**\n");
                for result in ranked.iter().take(5) {
                    text.push_str(&reply::online_result(result));
                }
                text.push_str(
                    "\n\n💡 **Tip:** Would you like to add any of these businesses to our database?\n\
                     Type \"**add a new business**\" to register one!",
                );
                text.push_str(&reply::suggestions_after_search());
                Ok(text)
            }
            Ok(_) => {
                state.reset();

                let suggestions = self.resolver.suggestions_for(query).await?;
                let suggestion_text = if suggestions.is_empty() {
                    String::new()
                } else {
                    format!(
                        "\n\n💡 **Did you mean:** {}?",
                        suggestions
                            .iter()
                            .take(3)
                            .cloned()
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                };

                Ok(format!(
                    "❌ No results found for \"{}\" in our database or online.{}\n\n\
                     **Try searching for:**\n\
                     - A different business name\n\
                     - A category (e.g., \"Restaurant\", \"Salon\")\n\
                     - A location (e.g., city name)\n\n\
                     Or type \"**add a new business**\" to register one!\n{}",
                    query,
                    suggestion_text,
                    reply::suggestions_after_search(),
                ))
            }
            Err(err) => {
                state.reset();
                Ok(format!(
                    "❌ Could not search online: {}\n\n\
                     No local results found for \"{}\".\n\n\
                     **What would you like to do?**\n\
                     - 🔍 Try a different search term\n\
                     - ➕ Type \"**add a new business**\" to register one\n{}",
                    err.message,
                    query,
                    reply::suggestions_after_search(),
                ))
            }
        }
    }
}

/// Renders a non-empty local result set with its framing lines.
fn render_local_results(resolved: &ResolvedSearch) -> String {
    let mut text = String::new();

    if !resolved.keyword.is_empty() && !resolved.location.is_empty() {
        text.push_str(&format!(
            "🔍 Searching for **\"{}\"** in **{}**\n\n",
            resolved.keyword, resolved.location
        ));
    } else if !resolved.keyword.is_empty() {
        text.push_str(&format!("🔍 Searching for **\"{}\"**\n\n", resolved.keyword));
    }

    if resolved.was_corrected {
        text.push_str("💡 _(Auto-corrected your search)_\n\n");
    }

    text.push_str(&format!(
        "✅ **Found {} top-rated business(es):**\n",
        resolved.results.len()
    ));
    for listing in resolved.results.iter().take(5) {
        text.push_str(&reply::local_result(listing));
    }
    text.push_str(&reply::suggestions_after_search());

    text
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::tests::{engine_over, IdentityRanker, StubOnlineSearch};
    use super::super::FlowEngine;
    use crate::adapters::memory::InMemoryListingStore;
    use crate::domain::conversation::state::{ConversationState, FlowMode};
    use crate::domain::foundation::ListingId;
    use crate::domain::listing::{Listing, NewListing, OnlineListing};
    use crate::ports::ListingStore;

    fn pizza_listing(id: i64, city: &str, rating: f64) -> Listing {
        Listing {
            id: ListingId::new(id),
            name: format!("Pizza Spot {}", id),
            address: "4 Market Road".to_string(),
            phone_number: "9000000000".to_string(),
            website: String::new(),
            category: "Pizza".to_string(),
            subcategory: String::new(),
            city: city.to_string(),
            state: String::new(),
            area: String::new(),
            reviews_count: 25,
            reviews_average: Some(rating),
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn local_hits_render_and_reset() {
        let store = Arc::new(InMemoryListingStore::new());
        store.seed(pizza_listing(1, "Mumbai", 4.5)).await;
        store.seed(pizza_listing(2, "Mumbai", 4.9)).await;

        let engine = engine_over(store);
        let mut state = ConversationState::new();

        let text = engine.handle_turn(&mut state, "find pizza in mumbai").await;

        assert!(text.contains("Searching for **\"pizza\"** in **mumbai**"));
        assert!(text.contains("Found 2 top-rated business(es)"));
        // Rating order: the 4.9 listing leads.
        let first = text.find("Pizza Spot 2").expect("ranked result missing");
        let second = text.find("Pizza Spot 1").expect("other result missing");
        assert!(first < second);
        assert_eq!(state.mode, FlowMode::Idle);
    }

    #[tokio::test]
    async fn keyword_fallback_when_the_city_has_no_match() {
        let store = Arc::new(InMemoryListingStore::new());
        store.seed(pizza_listing(1, "Delhi", 4.2)).await;

        let engine = engine_over(store);
        let mut state = ConversationState::new();

        let text = engine.handle_turn(&mut state, "pizza mumbai").await;
        assert!(text.contains("Pizza Spot 1"));
    }

    #[tokio::test]
    async fn online_escalation_renders_ranked_results() {
        let store = Arc::new(InMemoryListingStore::new());
        let online = Arc::new(StubOnlineSearch {
            results: vec![OnlineListing {
                name: Some("Cloud Nine Pizza".to_string()),
                address: Some("1 Sky Lane".to_string()),
                phone: Some("9111111111".to_string()),
                rating: Some(4.8),
                reviews: Some(210),
                category: Some("Pizza".to_string()),
            }],
            fail_with: None,
        });
        let engine = FlowEngine::new(store, online, Arc::new(IdentityRanker));
        let mut state = ConversationState::new();

        let text = engine.handle_turn(&mut state, "pizza mumbai").await;

        assert!(text.contains("No local results found"));
        assert!(text.contains("results from online search"));
        assert!(text.contains("Cloud Nine Pizza"));
        assert!(text.contains("add a new business"));
        assert_eq!(state.mode, FlowMode::Idle);
    }

    #[tokio::test]
    async fn nothing_anywhere_suggests_close_matches() {
        let store = Arc::new(InMemoryListingStore::new());
        store
            .insert(NewListing {
                name: "Harbor View".to_string(),
                address: "2 Pier Road".to_string(),
                phone_number: "9000000001".to_string(),
                category: "Restaurant".to_string(),
                city: "Mumbai".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let engine = engine_over(store);
        let mut state = ConversationState::new();

        // Corrects to the city "mumbai", which no keyword tier covers, so
        // every tier and the (empty) online stub come back dry.
        let text = engine.handle_turn(&mut state, "mumbbai").await;

        assert!(text.contains("No results found"));
        assert!(text.contains("Did you mean"));
        assert_eq!(state.mode, FlowMode::Idle);
    }

    #[tokio::test]
    async fn online_failure_surfaces_the_reason_and_resets() {
        let store = Arc::new(InMemoryListingStore::new());
        let online = Arc::new(StubOnlineSearch {
            results: vec![],
            fail_with: Some("connection timed out".to_string()),
        });
        let engine = FlowEngine::new(store, online, Arc::new(IdentityRanker));
        let mut state = ConversationState::new();

        let text = engine.handle_turn(&mut state, "pizza mumbai").await;

        assert!(text.contains("Could not search online: connection timed out"));
        assert_eq!(state.mode, FlowMode::Idle);
        assert_eq!(state.step, 0);
    }
}
