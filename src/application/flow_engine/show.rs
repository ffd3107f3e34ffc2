//! Show-my-business flow: one phone prompt, one detail card.

use crate::domain::conversation::reply;
use crate::domain::conversation::state::ConversationState;
use crate::domain::foundation::DomainError;
use crate::domain::phone;

use super::FlowEngine;

impl FlowEngine {
    pub(super) async fn show_step(
        &self,
        state: &mut ConversationState,
        input: &str,
    ) -> Result<String, DomainError> {
        let phone_input = input.trim();
        let normalized = phone::normalize(phone_input);

        if !phone::is_plausible(&normalized) {
            // Validation failure: re-prompt, same step.
            return Ok(reply::invalid_phone());
        }

        let listings = self.store.find_by_identity(&normalized).await?;

        match listings.into_iter().next() {
            None => {
                state.reset();
                Ok(reply::listing_not_found(phone_input))
            }
            Some(first) => {
                state.reset();

                let mut text = format!("✅ **Business Found!**\n{}", reply::listing_details(&first));
                if first.website.is_empty() {
                    text.push_str(&reply::website_tip());
                }
                text.push_str(&reply::suggestions_after_show());

                state.current_listing = Some(first);
                Ok(text)
            }
        }
    }
}
