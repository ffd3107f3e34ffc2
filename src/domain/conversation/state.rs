//! Per-session conversation state.
//!
//! One instance per authenticated session, passed `&mut` into every flow
//! engine operation. The engine is otherwise stateless; this struct is the
//! only mutable state in the core.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::listing::Listing;

/// Words that abort the active flow from any step, matched against the whole
/// trimmed lowercased utterance.
pub const CANCEL_WORDS: [&str; 5] = ["cancel", "exit", "quit", "stop", "nevermind"];

/// Which guided dialog is currently active, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowMode {
    Idle,
    Show,
    Update,
    Add,
    Search,
}

/// Mutable state of one session's conversation.
///
/// Invariant: `mode == Idle` implies `step == 0` and `data` is empty.
/// `current_listing` is the most recently resolved listing and survives a
/// flow reset; it anchors update/add follow-ups and the completion summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub mode: FlowMode,
    pub step: u32,
    pub data: HashMap<String, String>,
    pub current_listing: Option<Listing>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            mode: FlowMode::Idle,
            step: 0,
            data: HashMap::new(),
            current_listing: None,
        }
    }

    /// Enters a flow at its first step, clearing any accumulated data.
    pub fn start(&mut self, mode: FlowMode) {
        self.mode = mode;
        self.step = 1;
        self.data.clear();
    }

    /// Resets the flow to idle. Accumulated step data is dropped;
    /// `current_listing` is kept.
    pub fn reset(&mut self) {
        self.mode = FlowMode::Idle;
        self.step = 0;
        self.data.clear();
    }

    pub fn is_active(&self) -> bool {
        self.mode != FlowMode::Idle
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether an utterance is a universal cancel word.
pub fn is_cancel(input: &str) -> bool {
    let lowered = input.to_lowercase();
    CANCEL_WORDS.contains(&lowered.trim())
}
