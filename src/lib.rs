//! # switchboard - a multi-tool chat assistant
//!
//! switchboard answers each user message by routing it to at most a handful
//! of specialised tools and turning their observations into one reply.
//!
//! ## Overview
//!
//! The crate can be used in two ways:
//!
//! 1. **As a command-line assistant** - run the `switchboard` binary
//! 2. **As a library** - embed the agent loop and supply your own services
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use switchboard::agents::{build_registry, AgentLoop, ChatSession, RuleBasedRoutingPolicy};
//! use std::sync::Arc;
//!
//! let registry = build_registry(&deps)?;
//! let agent = AgentLoop::new(registry, Arc::new(RuleBasedRoutingPolicy::new()))
//!     .with_turn_budget(5);
//!
//! let mut session = ChatSession::new(Arc::new(agent));
//! println!("{}", session.send("What's the weather in Oslo?").await);
//! ```
//!
//! ## Tools
//!
//! Tools are consulted in this priority order:
//!
//! | Tool | Answers |
//! |------|---------|
//! | `DocumentKnowledgeBase` | questions about uploaded files |
//! | `DatabaseQuery` | employees, departments, salaries, budgets |
//! | `EventRecommender` | things to do today, weather-aware |
//! | `CurrentWeather` | current conditions for a place |
//! | `ImageGenerator` | drawing requests |
//! | `WebSearch` | general knowledge |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `openai` | OpenAI API support (default) |
//! | `ollama` | Ollama local inference |
//!
//! ## Modules
//!
//! - [`agents`] - Sub-agents, routing policies and the agent loop
//! - [`cli`] - Command-line parsing and terminal output
//! - [`db`] - Company and event stores (libsql)
//! - [`llm`] - LLM client implementations
//! - [`memory`] - Conversation state
//! - [`rag`] - Document chunking and BM25 retrieval
//! - [`services`] - Weather, image and web search clients
//! - [`tools`] - Tool trait and registry
//! - [`types`] - Shared types and errors
//! - [`utils`] - Configuration loading

/// Sub-agents, routing policies and the agent loop.
pub mod agents;
/// Command-line interface.
pub mod cli;
/// Local libsql stores.
pub mod db;
/// LLM provider clients and abstractions.
pub mod llm;
/// Conversation history and scratchpad.
pub mod memory;
/// Document retrieval.
pub mod rag;
/// Hosted service clients.
pub mod services;
/// Tool trait and registry.
pub mod tools;
/// Core types and errors.
pub mod types;
/// Configuration.
pub mod utils;

// Re-export commonly used types
pub use agents::{
    build_registry, AgentLoop, ChatSession, LlmRoutingPolicy, RoutingPolicy,
    RuleBasedRoutingPolicy, ToolDependencies,
};
pub use llm::{LLMClient, Provider};
pub use memory::ConversationState;
pub use tools::registry::{Tool, ToolContext, ToolRegistry};
pub use types::{AppError, Result};
pub use utils::toml_config::SwitchboardConfig;
