//! Conversation memory for a chat session.
//!
//! This module provides:
//! - [`ConversationState`], the append-only turn history owned by the agent loop
//! - The scratch buffer holding the reasoning trail of the message in flight
//! - History windowing helpers used when building prompts

use crate::types::{Role, Turn};

/// Default number of recent turns to include in prompts.
pub const DEFAULT_HISTORY_WINDOW: usize = 20;

/// Ordered, append-only conversation history plus the scratchpad for the
/// current reasoning step.
///
/// Turns can be appended and read but never edited or removed; the only way
/// to drop history is [`ConversationState::reset`], which models the user
/// starting a new session.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    turns: Vec<Turn>,
    scratchpad: String,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::assistant(content));
    }

    pub fn push_tool(&mut self, tool_name: impl Into<String>, content: impl Into<String>) {
        self.turns.push(Turn::tool(tool_name, content));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recent `window` turns, oldest first.
    pub fn recent(&self, window: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(window);
        &self.turns[start..]
    }

    /// The latest user message, if any.
    pub fn last_user_message(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role() == Role::User)
            .map(|t| t.content())
    }

    /// Tool turns appended after the latest user message.
    pub fn current_observations(&self) -> &[Turn] {
        let start = self
            .turns
            .iter()
            .rposition(|t| t.role() == Role::User)
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.turns[start..]
    }

    pub fn scratchpad(&self) -> &str {
        &self.scratchpad
    }

    /// Append one line to the scratchpad.
    pub fn note(&mut self, line: impl AsRef<str>) {
        if !self.scratchpad.is_empty() {
            self.scratchpad.push('\n');
        }
        self.scratchpad.push_str(line.as_ref());
    }

    pub fn clear_scratchpad(&mut self) {
        self.scratchpad.clear();
    }

    /// Drop all history. Only called when the user starts a new session.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.scratchpad.clear();
    }
}

/// Estimates token count for a message (rough approximation).
///
/// Uses a simple heuristic of ~4 characters per token for English text.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}
