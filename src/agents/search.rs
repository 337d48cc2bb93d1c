use crate::services::SearchService;
use crate::tools::{Tool, ToolContext, WEB_SEARCH};
use async_trait::async_trait;
use std::sync::Arc;

/// Fallback tool for general knowledge questions.
pub struct WebSearchAgent {
    search: Arc<dyn SearchService>,
}

impl WebSearchAgent {
    pub fn new(search: Arc<dyn SearchService>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Tool for WebSearchAgent {
    fn name(&self) -> &str {
        WEB_SEARCH
    }

    fn description(&self) -> &str {
        "A web search engine. Use this for general questions about current events \
         or facts that none of the other tools cover. Input should be a search query."
    }

    async fn invoke(&self, argument: &str, _context: &ToolContext<'_>) -> String {
        match self.search.search(argument).await {
            Ok(hits) if hits.is_empty() => format!("No results found for: {}", argument),
            Ok(hits) => {
                tracing::info!(query = argument, results = hits.len(), "Web search completed");
                hits.iter()
                    .map(|hit| format!("{}\n{}\n{}", hit.title, hit.description, hit.url))
                    .collect::<Vec<_>>()
                    .join("\n\n")
            }
            Err(e) => {
                tracing::warn!(query = argument, error = %e, "Web search failed");
                format!("Error: {}", e)
            }
        }
    }
}
