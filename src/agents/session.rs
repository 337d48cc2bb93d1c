use super::agent_loop::AgentLoop;
use crate::memory::ConversationState;
use std::sync::Arc;
use uuid::Uuid;

/// A user's conversation with the assistant.
///
/// Owns the conversation state; the agent loop is shared and stateless
/// between messages.
pub struct ChatSession {
    id: Uuid,
    agent: Arc<AgentLoop>,
    state: ConversationState,
}

impl ChatSession {
    pub fn new(agent: Arc<AgentLoop>) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent,
            state: ConversationState::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Send a message and get the assistant's reply. Errors that end the
    /// turn are reported in the reply text.
    pub async fn send(&mut self, message: &str) -> String {
        match self.agent.run_turn(&mut self.state, message).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(session = %self.id, error = %e, "Turn failed");
                format!("An error occurred: {}", e)
            }
        }
    }

    /// Start over with an empty history under a new id.
    pub fn reset(&mut self) {
        self.state.reset();
        self.id = Uuid::new_v4();
        tracing::info!(session = %self.id, "Session reset");
    }
}
