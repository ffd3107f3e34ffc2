//! Conversational flow engine.
//!
//! Each user utterance enters [`FlowEngine::handle_turn`] together with the
//! session's [`ConversationState`]. If a flow is active the utterance is
//! consumed as that flow's next step input; otherwise the intent classifier
//! picks a branch, which may start a flow or run a search directly. The
//! engine holds no session state of its own and can be shared across
//! sessions.

mod add;
mod search;
mod show;
mod update;

use std::sync::Arc;

use crate::application::corpus::CorpusCache;
use crate::application::search_resolver::SearchResolver;
use crate::domain::conversation::reply;
use crate::domain::conversation::state::{is_cancel, ConversationState, FlowMode};
use crate::domain::foundation::DomainError;
use crate::domain::guard;
use crate::domain::intent::{self, Intent};
use crate::ports::{ListingStore, OnlineResultRanker, OnlineSearch};

/// How many category suggestions to pull for an empty search prompt.
const SUGGESTED_CATEGORY_LIMIT: usize = 15;

/// Drives the show/update/add/search dialogs for every session.
pub struct FlowEngine {
    store: Arc<dyn ListingStore>,
    online: Arc<dyn OnlineSearch>,
    ranker: Arc<dyn OnlineResultRanker>,
    resolver: SearchResolver,
}

impl FlowEngine {
    pub fn new(
        store: Arc<dyn ListingStore>,
        online: Arc<dyn OnlineSearch>,
        ranker: Arc<dyn OnlineResultRanker>,
    ) -> Self {
        let corpus = Arc::new(CorpusCache::new(store.clone()));
        let resolver = SearchResolver::new(store.clone(), corpus);
        Self {
            store,
            online,
            ranker,
            resolver,
        }
    }

    /// Processes one utterance and produces one reply.
    ///
    /// Collaborator errors that escape the flow-specific handling reset the
    /// flow and surface as a recovery prompt; they never end the session.
    pub async fn handle_turn(&self, state: &mut ConversationState, input: &str) -> String {
        // The spam guard gates new conversations only. Step inputs inside an
        // active flow (menu digits, "1") are legitimately short and are
        // validated by the step logic itself.
        if !state.is_active() && guard::is_suspicious(input) {
            return reply::suspicious_input();
        }

        match self.process(state, input).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "flow aborted by collaborator error");
                state.reset();
                reply::generic_error(&err.message)
            }
        }
    }

    async fn process(
        &self,
        state: &mut ConversationState,
        input: &str,
    ) -> Result<String, DomainError> {
        if state.is_active() {
            // The universal cancel escape is checked before any step logic.
            if is_cancel(input) {
                state.reset();
                return Ok(reply::cancelled());
            }

            return match state.mode {
                FlowMode::Show => self.show_step(state, input).await,
                FlowMode::Update => self.update_step(state, input).await,
                FlowMode::Add => self.add_step(state, input).await,
                FlowMode::Search => self.search_step(state, input).await,
                FlowMode::Idle => self.dispatch(state, input).await,
            };
        }

        self.dispatch(state, input).await
    }

    /// Intent branch selection when no flow is active.
    async fn dispatch(
        &self,
        state: &mut ConversationState,
        input: &str,
    ) -> Result<String, DomainError> {
        match intent::classify(input) {
            Intent::Greeting => Ok(reply::greeting()),
            Intent::Show => {
                state.start(FlowMode::Show);
                Ok(reply::show_intro())
            }
            Intent::Update => {
                state.start(FlowMode::Update);
                Ok(reply::update_intro())
            }
            Intent::Add => {
                state.start(FlowMode::Add);
                Ok(reply::add_intro())
            }
            Intent::Search => {
                let residue = intent::strip_search_phrases(input);
                if residue.chars().count() >= 2 {
                    // Enough of a query survived; search right away.
                    state.start(FlowMode::Search);
                    self.search_step(state, &residue).await
                } else {
                    state.start(FlowMode::Search);
                    Ok(self.search_prompt().await?)
                }
            }
            Intent::General => {
                // No recognizable command: treat the whole utterance as a
                // search query with online escalation.
                state.start(FlowMode::Search);
                self.search_step(state, input).await
            }
        }
    }

    /// "What would you like to search for?" with popular categories.
    async fn search_prompt(&self) -> Result<String, DomainError> {
        let categories = self
            .store
            .suggested_categories(SUGGESTED_CATEGORY_LIMIT)
            .await?;

        let category_text = if categories.is_empty() {
            String::new()
        } else {
            let listed = categories
                .iter()
                .take(8)
                .map(|c| format!("🏷️ {}", c))
                .collect::<Vec<_>>()
                .join(", ");
            format!("\n\n**Popular categories in our database:**\n{}", listed)
        };

        Ok(format!(
            "🔍 What would you like to search for?\n\n\
             You can search by:\n\
             - Business name\n\
             - Category (e.g., Restaurant, Salon, Store)\n\
             - Location/City{}",
            category_text
        ))
    }
}
