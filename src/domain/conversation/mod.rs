//! Conversation state and reply formatting.

pub mod reply;
pub mod state;

pub use state::{ConversationState, FlowMode};
