use crate::types::{AppError, Result, ToolDefinition, Turn};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Shared, read-only context handed to a tool invocation.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    /// Conversation so far, oldest first.
    pub history: &'a [Turn],
    /// The date tools should treat as "today".
    pub today: NaiveDate,
}

/// A named capability the routing policy can select.
///
/// `invoke` never fails: every tool converts its own failures into a
/// human-readable observation so the conversation can react to them.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    /// Routing hint shown to the policy.
    fn description(&self) -> &str;
    async fn invoke(&self, argument: &str, context: &ToolContext<'_>) -> String;
}

/// Ordered tool catalog. Registration order is the priority order presented
/// to the routing policy.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateName`] if a tool with the same name is
    /// already registered; the registry is left unchanged.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        if self.has_tool(tool.name()) {
            return Err(AppError::DuplicateName(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Registered tools in registration order.
    pub fn list(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub async fn invoke(
        &self,
        name: &str,
        argument: &str,
        context: &ToolContext<'_>,
    ) -> Result<String> {
        match self.get(name) {
            Some(tool) => Ok(tool.invoke(argument, context).await),
            None => Err(AppError::NotFound(format!("Tool not found: {}", name))),
        }
    }

    /// Get a list of all registered tool names
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
