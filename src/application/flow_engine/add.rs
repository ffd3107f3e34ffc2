//! Add-a-business flow: seven sequential questions, one field per turn,
//! re-prompting the same step on invalid input, then a single insert.

use crate::domain::conversation::reply;
use crate::domain::conversation::state::ConversationState;
use crate::domain::foundation::DomainError;
use crate::domain::listing::NewListing;
use crate::domain::phone;

use super::FlowEngine;

/// Answers that skip the optional website question.
const WEBSITE_SKIP: [&str; 5] = ["skip", "none", "n/a", "-", ""];

/// Answers that leave city/state empty.
const PLACE_SKIP: [&str; 2] = ["skip", "none"];

fn add_error(message: &str) -> String {
    format!(
        "❌ An error occurred: {}\n\n\
         What would you like to do?\n\
         - ➕ Type \"**add a new business**\" to try again",
        message
    )
}

impl FlowEngine {
    pub(super) async fn add_step(
        &self,
        state: &mut ConversationState,
        input: &str,
    ) -> Result<String, DomainError> {
        let value = input.trim();

        match state.step {
            1 => {
                if value.chars().count() < 2 {
                    return Ok(
                        "⚠️ Please enter a valid business name (at least 2 characters):"
                            .to_string(),
                    );
                }
                state.data.insert("name".to_string(), value.to_string());
                state.step = 2;
                Ok(format!(
                    "Great! Your business is: **{}**\n\n\
                     📞 **What is your business phone number?**\n\
                     _(Example: 9873312399 or 98733 12399)_",
                    value
                ))
            }
            2 => {
                let normalized = phone::normalize(value);
                if !phone::is_plausible(&normalized) {
                    return Ok("⚠️ Please enter a valid phone number (at least 6 digits):\n\
                               _(Example: 9873312399 or 98733 12399)_"
                        .to_string());
                }
                // Stored normalized from here on.
                state
                    .data
                    .insert("phone_number".to_string(), normalized.clone());
                state.step = 3;
                Ok(format!(
                    "📞 Phone: **{}**\n\n📍 **What is your business address?**",
                    normalized
                ))
            }
            3 => {
                if value.chars().count() < 5 {
                    return Ok(
                        "⚠️ Please enter a valid address (at least 5 characters):".to_string()
                    );
                }
                state.data.insert("address".to_string(), value.to_string());
                state.step = 4;
                Ok(format!(
                    "📍 Address: **{}**\n\n\
                     🌐 **What is your business website?** _(optional - type \"skip\" to skip)_",
                    value
                ))
            }
            4 => {
                let website = if WEBSITE_SKIP.contains(&value.to_lowercase().as_str()) {
                    String::new()
                } else {
                    value.to_string()
                };
                state.data.insert("website".to_string(), website);
                state.step = 5;
                Ok("🏷️ **What category is your business?**\n\
                    _(Example: Restaurant, Salon, Retail Store, Healthcare, etc.)_"
                    .to_string())
            }
            5 => {
                if value.chars().count() < 2 {
                    return Ok("⚠️ Please enter a business category:\n\
                               _(Example: Restaurant, Salon, Retail Store, Healthcare, etc.)_"
                        .to_string());
                }
                state.data.insert("category".to_string(), value.to_string());
                state.step = 6;
                Ok(format!(
                    "🏷️ Category: **{}**\n\n📍 **What city is your business located in?**",
                    value
                ))
            }
            6 => {
                let city = if value.is_empty() || PLACE_SKIP.contains(&value.to_lowercase().as_str())
                {
                    String::new()
                } else {
                    value.to_string()
                };
                state.data.insert("city".to_string(), city);
                state.step = 7;
                Ok("📍 **What state is your business located in?**".to_string())
            }
            7 => {
                let state_field =
                    if value.is_empty() || PLACE_SKIP.contains(&value.to_lowercase().as_str()) {
                        String::new()
                    } else {
                        value.to_string()
                    };
                state.data.insert("state".to_string(), state_field);

                self.add_submit(state).await
            }
            _ => {
                state.reset();
                Ok(reply::generic_error("unexpected flow step"))
            }
        }
    }

    /// Submits the accumulated fields to the storage insert contract.
    async fn add_submit(&self, state: &mut ConversationState) -> Result<String, DomainError> {
        let field = |key: &str| state.data.get(key).cloned().unwrap_or_default();

        let new_listing = NewListing {
            name: field("name"),
            address: field("address"),
            phone_number: field("phone_number"),
            website: field("website"),
            category: field("category"),
            subcategory: String::new(),
            city: field("city"),
            state: field("state"),
            area: String::new(),
        };

        let summary = (
            new_listing.name.clone(),
            new_listing.phone_number.clone(),
            new_listing.address.clone(),
            new_listing.website.clone(),
            new_listing.category.clone(),
            new_listing.city.clone(),
            new_listing.state.clone(),
        );

        let inserted = match self.store.insert(new_listing).await {
            Ok(id) => id,
            Err(err) => {
                state.reset();
                return Ok(add_error(&err.message));
            }
        };

        match inserted {
            Some(new_id) => {
                let (name, phone_number, address, website, category, city, state_field) = summary;

                // Fresh lookup so follow-ups anchor on the stored record.
                match self.store.find_by_identity(&phone_number).await {
                    Ok(listings) => state.current_listing = listings.into_iter().next(),
                    Err(err) => {
                        state.reset();
                        return Ok(add_error(&err.message));
                    }
                }
                state.reset();

                Ok(format!(
                    "✅ **Business Added Successfully!**\n\n\
                     Your business has been registered with ID: **{}**\n\n\
                     **Summary:**\n\
                     - 🏢 **Name:** {}\n\
                     - 📞 **Phone:** {}\n\
                     - 📍 **Address:** {}\n\
                     - 🌐 **Website:** {}\n\
                     - 🏷️ **Category:** {}\n\
                     - 📍 **City:** {}\n\
                     - 📍 **State:** {}\n{}",
                    new_id,
                    name,
                    phone_number,
                    address,
                    if website.is_empty() { "Not set" } else { website.as_str() },
                    category,
                    if city.is_empty() { "Not set" } else { city.as_str() },
                    if state_field.is_empty() {
                        "Not set"
                    } else {
                        state_field.as_str()
                    },
                    reply::suggestions_after_add(),
                ))
            }
            None => {
                state.reset();
                Ok("❌ Failed to add the business. Please try again.\n\n\
                    What would you like to do?\n\
                    - ➕ Type \"**add a new business**\" to try again"
                    .to_string())
            }
        }
    }
}
