use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============= Conversation Types =============

/// Who produced a turn in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A single entry in the conversation history.
///
/// Turns are immutable once appended to a `ConversationState`; the fields
/// are private and only readable through accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
    timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), None)
    }

    pub fn tool(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content.into(), Some(tool_name.into()))
    }

    fn new(role: Role, content: String, tool_name: Option<String>) -> Self {
        Self {
            role,
            content,
            tool_name,
            timestamp: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.tool_name.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

// ============= Tool Types =============

/// Name and routing hint of a registered tool, as shown to the routing policy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
}

/// The outcome of one routing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Answer the user directly with this text.
    FinalAnswer(String),
    /// Run exactly one tool with the given argument text.
    Invoke { tool: String, argument: String },
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Network or HTTP failure talking to an external API.
    #[error("Service error: {0}")]
    Service(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Generated SQL contained a data-mutating keyword.
    #[error("{0}")]
    QueryRejected(String),

    #[error("Query failed: {0}")]
    QueryExecution(String),

    /// Routing output could not be mapped to a tool or a final answer.
    #[error("Could not parse routing decision: {0}")]
    Parse(String),

    /// A required resource (such as the document index) does not exist yet.
    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("A tool named '{0}' is already registered")]
    DuplicateName(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
