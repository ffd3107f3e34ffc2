//! Fixed reply templates and listing formatting.
//!
//! Every turn produces exactly one markdown text block built from these
//! templates. Keeping them in one place keeps the flow logic readable and
//! the wording testable.

use crate::domain::listing::{Listing, OnlineListing};

fn value_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Human label for an updatable field key ("phone_number" -> "Phone Number").
pub fn field_label(field_key: &str) -> String {
    field_key
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Greeting with the four suggested actions.
pub fn greeting() -> String {
    "Hi 👋 I can help you manage your business.\n\n\
     What would you like to do next?\n\
     - 🔍 **Search for a business** - Find restaurants, salons, stores, etc.\n\
     - 📋 **Show my business** - View your business details\n\
     - ✏️ **Update my business** - Edit your business information\n\
     - ➕ **Add a new business** - Register a new business\n\n\
     Just type what you're looking for! For example: \"Find a restaurant near me\" or \"Search for salons\""
        .to_string()
}

/// Acknowledgment after a universal cancel.
pub fn cancelled() -> String {
    "No problem! I've cancelled the current operation.\n\n\
     What would you like to do next?\n\
     - 🔍 **Show my business**\n\
     - ✏️ **Update my business**\n\
     - ➕ **Add a new business**"
        .to_string()
}

/// Rejection for input the spam guard flagged.
pub fn suspicious_input() -> String {
    "Invalid or suspicious input detected".to_string()
}

/// Recovery prompt wrapping an unexpected collaborator error.
pub fn generic_error(message: &str) -> String {
    format!(
        "❌ An error occurred: {}\n\n\
         What would you like to do?\n\
         - 🔍 Type \"**show my business**\"\n\
         - ✏️ Type \"**update my business**\"\n\
         - ➕ Type \"**add a new business**\"",
        message
    )
}

pub fn suggestions_after_show() -> String {
    "\n---\n**What would you like to do next?**\n\
     - ✏️ Type \"**update my business**\" to make changes\n\
     - ➕ Type \"**add a new business**\" to register another business\n\
     - 🔍 Type \"**search for**\" + what you need"
        .to_string()
}

pub fn suggestions_after_search() -> String {
    "\n---\n**What would you like to do next?**\n\
     - 🔍 Search for something else\n\
     - 📋 Type \"**show my business**\" to view your business\n\
     - ✏️ Type \"**update my business**\" to make changes"
        .to_string()
}

pub fn suggestions_after_update() -> String {
    "\n---\n**What would you like to do next?**\n\
     - 🔍 Type \"**show my business**\" to view the updated details\n\
     - ✏️ Type \"**update my business**\" to make more changes\n\
     - ➕ Type \"**add a new business**\" to register another business"
        .to_string()
}

pub fn suggestions_after_add() -> String {
    "\n---\n**What would you like to do next?**\n\
     - 🔍 Type \"**show my business**\" to view your new business\n\
     - ✏️ Type \"**update my business**\" to make changes to it\n\
     - ➕ Type \"**add a new business**\" to register another business"
        .to_string()
}

/// Full detail card for a listing.
pub fn listing_details(listing: &Listing) -> String {
    format!(
        "\n### 🏢 {}\n\
         - 📍 **Address:** {}\n\
         - 📞 **Phone:** {}\n\
         - 🌐 **Website:** {}\n\
         - 🏷️ **Category:** {}\n\
         - 📍 **City:** {}\n\
         - 📍 **State:** {}\n",
        value_or(&listing.name, "N/A"),
        value_or(&listing.address, "N/A"),
        value_or(&listing.phone_number, "N/A"),
        value_or(&listing.website, "Not set"),
        value_or(&listing.category, "N/A"),
        value_or(&listing.city, "N/A"),
        value_or(&listing.state, "N/A"),
    )
}

/// One local search hit.
pub fn local_result(listing: &Listing) -> String {
    let rating = listing
        .reviews_average
        .map(|r| r.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "\n### {}\n\
         - 📍 {}\n\
         - 📞 {}\n\
         - ⭐ {} ({} reviews)\n\
         - 🏷️ {}\n\
         - 📁 Database\n---",
        value_or(&listing.name, "N/A"),
        value_or(&listing.address, "N/A"),
        value_or(&listing.phone_number, "N/A"),
        rating,
        listing.reviews_count,
        value_or(&listing.category, "N/A"),
    )
}

/// One online search hit.
pub fn online_result(result: &OnlineListing) -> String {
    let rating = result
        .rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "\n### {}\n\
         - 📍 {}\n\
         - 📞 {}\n\
         - ⭐ {} ({} reviews)\n\
         - 🏷️ {}\n\
         - 🌐 Online\n---",
        result.name.as_deref().unwrap_or("N/A"),
        result.address.as_deref().unwrap_or("N/A"),
        result.phone.as_deref().unwrap_or("N/A"),
        rating,
        result.reviews.unwrap_or(0),
        result.category.as_deref().unwrap_or("N/A"),
    )
}

/// The fixed 7-field update menu with current values.
pub fn update_menu(listing: &Listing) -> String {
    format!(
        "1️⃣ **Name** - Current: {}\n\
         2️⃣ **Address** - Current: {}\n\
         3️⃣ **Phone** - Current: {}\n\
         4️⃣ **Website** - Current: {}\n\
         5️⃣ **Category** - Current: {}\n\
         6️⃣ **City** - Current: {}\n\
         7️⃣ **State** - Current: {}",
        value_or(&listing.name, "Not set"),
        value_or(&listing.address, "Not set"),
        value_or(&listing.phone_number, "Not set"),
        value_or(&listing.website, "Not set"),
        value_or(&listing.category, "Not set"),
        value_or(&listing.city, "Not set"),
        value_or(&listing.state, "Not set"),
    )
}

/// Tip appended when a listing has no website.
pub fn website_tip() -> String {
    "\n💡 **Tip:** Adding a website can increase visibility and trust!\n".to_string()
}

pub fn show_intro() -> String {
    "🔍 Let's find your business!\n\n\
     Please enter the **phone number** associated with your business:\n\
     _(Example: 9873312399 or 98733 12399)_"
        .to_string()
}

pub fn update_intro() -> String {
    "✏️ Let's update your business details!\n\n\
     Please enter the **phone number** associated with your business:\n\
     _(Example: 9873312399 or 98733 12399)_"
        .to_string()
}

pub fn add_intro() -> String {
    "➕ Great! Let's add a new business.\n\n\
     I'll ask you a few questions to register your business. Let's start!\n\n\
     **What is the name of your business?**"
        .to_string()
}

pub fn invalid_phone() -> String {
    "⚠️ That doesn't look like a valid phone number.\n\n\
     Please enter a valid phone number (at least 6 digits):\n\
     _(Example: 9873312399 or 98733 12399)_"
        .to_string()
}

/// Not-found reply for the show/update flows, with the offer to register.
pub fn listing_not_found(phone: &str) -> String {
    format!(
        "❌ No business found with phone number **{}**\n\n\
         The number doesn't match any registered business in our database.\n\n\
         **Would you like to register this business?**\n\
         - ➕ Type \"**add a new business**\" to register it\n\
         - 🔍 Type \"**show my business**\" to try another number",
        phone
    )
}
