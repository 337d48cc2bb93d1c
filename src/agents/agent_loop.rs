use super::router::RoutingPolicy;
use crate::memory::ConversationState;
use crate::tools::{ToolContext, ToolRegistry};
use crate::types::{Result, RoutingDecision};
use chrono::{Local, NaiveDate};
use std::sync::Arc;

/// Default maximum number of tool invocations per user message.
pub const DEFAULT_TURN_BUDGET: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoopState {
    AwaitingDecision,
    ToolRunning { tool: String, argument: String },
    Responding(String),
    Done(String),
}

/// Runs one user message through routing and tool invocation.
pub struct AgentLoop {
    registry: ToolRegistry,
    policy: Arc<dyn RoutingPolicy>,
    turn_budget: usize,
    today: Option<NaiveDate>,
}

impl AgentLoop {
    pub fn new(registry: ToolRegistry, policy: Arc<dyn RoutingPolicy>) -> Self {
        Self {
            registry,
            policy,
            turn_budget: DEFAULT_TURN_BUDGET,
            today: None,
        }
    }

    /// A budget of zero is raised to one.
    pub fn with_turn_budget(mut self, turn_budget: usize) -> Self {
        self.turn_budget = turn_budget.max(1);
        self
    }

    /// Pin the date tools treat as "today" instead of reading the clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn turn_budget(&self) -> usize {
        self.turn_budget
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Process `message` to a final answer.
    ///
    /// The user message, every observation and the answer are appended to
    /// `state`. Tool failures come back as observation text; only a routing
    /// failure ends the turn early, in which case `state` keeps every turn
    /// appended before the failure.
    pub async fn run_turn(&self, state: &mut ConversationState, message: &str) -> Result<String> {
        state.push_user(message);
        state.clear_scratchpad();

        let tools = self.registry.get_tool_definitions();
        let today = self.today();
        let mut invocations = 0;
        let mut current = LoopState::AwaitingDecision;

        loop {
            current = match current {
                LoopState::AwaitingDecision => match self.policy.decide(state, &tools).await? {
                    RoutingDecision::FinalAnswer(answer) => LoopState::Responding(answer),
                    RoutingDecision::Invoke { tool, argument } => {
                        LoopState::ToolRunning { tool, argument }
                    }
                },
                LoopState::ToolRunning { tool, argument } => {
                    invocations += 1;
                    tracing::info!(tool = %tool, argument = %argument, invocations, "Invoking tool");

                    let context = ToolContext {
                        history: state.turns(),
                        today,
                    };
                    let observation = self
                        .registry
                        .invoke(&tool, &argument, &context)
                        .await
                        .unwrap_or_else(|e| format!("Error: {}", e));
                    tracing::info!(tool = %tool, chars = observation.len(), "Tool returned");

                    state.note(format!("Invoked {} with '{}'", tool, argument));
                    state.push_tool(tool, observation);

                    if invocations >= self.turn_budget {
                        tracing::warn!(budget = self.turn_budget, "Turn budget exhausted");
                        LoopState::Responding(self.policy.synthesize(state).await)
                    } else {
                        LoopState::AwaitingDecision
                    }
                }
                LoopState::Responding(answer) => {
                    state.push_assistant(answer.clone());
                    state.clear_scratchpad();
                    LoopState::Done(answer)
                }
                LoopState::Done(answer) => return Ok(answer),
            };
        }
    }
}
