//! Update-my-business flow: phone lookup, field menu, value entry, and the
//! loop back to the menu so several fields can be edited in one session.

use std::collections::HashMap;

use crate::domain::conversation::reply;
use crate::domain::conversation::state::ConversationState;
use crate::domain::foundation::DomainError;
use crate::domain::listing::Listing;
use crate::domain::phone;
use crate::ports::UpdateTarget;

use super::FlowEngine;

/// Words that finish the update session from the field menu. Overlaps the
/// universal cancel set on purpose; the cancel check runs first, so only the
/// non-cancel words ever reach this flow.
const DONE_WORDS: [&str; 5] = ["done", "finish", "exit", "no", "cancel"];

/// Maps a menu selector (digit or field name) to the storage field key.
fn selected_field(input: &str) -> Option<&'static str> {
    match input {
        "1" | "name" => Some("name"),
        "2" | "address" => Some("address"),
        "3" | "phone" | "phone number" => Some("phone_number"),
        "4" | "website" => Some("website"),
        "5" | "category" => Some("category"),
        "6" | "city" => Some("city"),
        "7" | "state" => Some("state"),
        _ => None,
    }
}

fn field_value<'a>(listing: &'a Listing, key: &str) -> &'a str {
    match key {
        "name" => &listing.name,
        "address" => &listing.address,
        "phone_number" => &listing.phone_number,
        "website" => &listing.website,
        "category" => &listing.category,
        "city" => &listing.city,
        "state" => &listing.state,
        _ => "",
    }
}

fn unrecognized_selector() -> String {
    "⚠️ I didn't understand that. Please choose from:\n\
     1️⃣ **Name**\n\
     2️⃣ **Address**\n\
     3️⃣ **Phone**\n\
     4️⃣ **Website**\n\
     5️⃣ **Category**\n\
     6️⃣ **City**\n\
     7️⃣ **State**\n\n\
     Type the number (1-7) or field name, or \"**done**\" to finish:"
        .to_string()
}

impl FlowEngine {
    pub(super) async fn update_step(
        &self,
        state: &mut ConversationState,
        input: &str,
    ) -> Result<String, DomainError> {
        match state.step {
            1 => self.update_collect_phone(state, input).await,
            2 => Ok(self.update_select_field(state, input)),
            3 => self.update_apply_value(state, input).await,
            _ => {
                state.reset();
                Ok(reply::generic_error("unexpected flow step"))
            }
        }
    }

    async fn update_collect_phone(
        &self,
        state: &mut ConversationState,
        input: &str,
    ) -> Result<String, DomainError> {
        let phone_input = input.trim();
        let normalized = phone::normalize(phone_input);

        if !phone::is_plausible(&normalized) {
            return Ok(reply::invalid_phone());
        }

        let listings = self.store.find_by_identity(&normalized).await?;

        match listings.into_iter().next() {
            None => {
                state.reset();
                Ok(reply::listing_not_found(phone_input))
            }
            Some(first) => {
                state.data.insert("phone".to_string(), phone_input.to_string());
                state.step = 2;

                let mut text = format!(
                    "✅ **Business Found!**\n{}\n\
                     **Which field would you like to update?**\n{}\n\n\
                     Just type the field name or number (e.g., \"name\" or \"1\"):",
                    reply::listing_details(&first),
                    reply::update_menu(&first),
                );
                if first.website.is_empty() {
                    text.push_str(
                        "\n\n💡 **Suggestion:** Adding a website can increase visibility and trust!",
                    );
                }

                state.current_listing = Some(first);
                Ok(text)
            }
        }
    }

    fn update_select_field(&self, state: &mut ConversationState, input: &str) -> String {
        let field_input = input.trim().to_lowercase();

        if DONE_WORDS.contains(&field_input.as_str()) {
            state.reset();
            let details = state
                .current_listing
                .as_ref()
                .map(reply::listing_details)
                .unwrap_or_default();
            return format!(
                "✅ **Update complete!**\n{}\n{}",
                details,
                reply::suggestions_after_update()
            );
        }

        match selected_field(&field_input) {
            None => unrecognized_selector(),
            Some(field_key) => {
                state
                    .data
                    .insert("update_field".to_string(), field_key.to_string());
                state.step = 3;

                let current = state
                    .current_listing
                    .as_ref()
                    .map(|listing| field_value(listing, field_key))
                    .filter(|value| !value.is_empty())
                    .unwrap_or("Not set");

                format!(
                    "✏️ Updating **{}**\n\nCurrent value: **{}**\n\nPlease enter the new value:",
                    reply::field_label(field_key),
                    current,
                )
            }
        }
    }

    async fn update_apply_value(
        &self,
        state: &mut ConversationState,
        input: &str,
    ) -> Result<String, DomainError> {
        let new_value = input.trim();

        if new_value.is_empty() {
            return Ok("⚠️ Please enter a value. Type the new value for the field:".to_string());
        }

        let field_key = match state.data.get("update_field").cloned() {
            Some(key) => key,
            None => {
                state.reset();
                return Ok("⚠️ Something went wrong. Please start again.\n\n\
                           Type \"**update my business**\" to try again."
                    .to_string());
            }
        };

        match self.apply_and_refresh(state, &field_key, new_value).await {
            Err(err) => {
                // Fatal to the flow, not to the session.
                state.reset();
                Ok(format!(
                    "❌ Error updating business: {}\n\n\
                     What would you like to do?\n\
                     - ✏️ Type \"**update my business**\" to try again\n\
                     - 🔍 Type \"**show my business**\" to view details",
                    err.message
                ))
            }
            Ok(false) => Ok(format!(
                "⚠️ Could not update **{}**.\n\n\
                 Please try entering a different value, or type \"**done**\" to exit:",
                reply::field_label(&field_key)
            )),
            Ok(true) => {
                // Loop back to the field menu with fresh values.
                state.step = 2;

                let menu_block = state
                    .current_listing
                    .as_ref()
                    .map(|listing| {
                        format!(
                            "{}\n\
                             **Would you like to update another field?**\n{}",
                            reply::listing_details(listing),
                            reply::update_menu(listing),
                        )
                    })
                    .unwrap_or_default();

                Ok(format!(
                    "✅ **Successfully Updated!**\n\n\
                     **{}** has been updated to: **{}**\n\n{}\n\n\
                     Type a number (1-7) to update another field, or type \"**done**\" to finish.",
                    reply::field_label(&field_key),
                    new_value,
                    menu_block,
                ))
            }
        }
    }

    /// Writes one field, trying match-by-id first and falling back to the
    /// identity key, then refreshes `current_listing` from storage.
    async fn apply_and_refresh(
        &self,
        state: &mut ConversationState,
        field_key: &str,
        new_value: &str,
    ) -> Result<bool, DomainError> {
        let mut updates = HashMap::new();
        updates.insert(field_key.to_string(), new_value.to_string());

        let mut success = false;

        if let Some(listing) = &state.current_listing {
            success = self
                .store
                .update(UpdateTarget::ById(listing.id), &updates)
                .await?;
        }

        if !success {
            if let Some(phone_for_update) = state.data.get("phone") {
                let identity = phone::normalize(phone_for_update);
                if !identity.is_empty() {
                    success = self
                        .store
                        .update(UpdateTarget::ByIdentity(identity), &updates)
                        .await?;
                }
            }
        }

        if success {
            if let Some(phone_for_update) = state.data.get("phone") {
                let refreshed = self
                    .store
                    .find_by_identity(&phone::normalize(phone_for_update))
                    .await?;
                if !refreshed.is_empty() {
                    let old_id = state.current_listing.as_ref().map(|l| l.id);
                    state.current_listing = refreshed
                        .iter()
                        .find(|b| Some(b.id) == old_id)
                        .cloned()
                        .or_else(|| refreshed.first().cloned());
                }
            }
        }

        Ok(success)
    }
}
