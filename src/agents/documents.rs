use crate::llm::LLMClient;
use crate::rag::{DocumentIndex, Passage};
use crate::tools::{Tool, ToolContext, DOCUMENT_KNOWLEDGE_BASE};
use crate::types::{AppError, Result, Role};
use async_trait::async_trait;
use std::sync::Arc;

/// Phrases in an answer that mean the documents did not cover the question.
const NOT_FOUND_PHRASES: [&str; 2] = ["don't know", "no information"];

const NOT_READY: &str = "Error: The document knowledge base is not initialized. \
Please tell the user to upload documents first.";

const SYSTEM_PROMPT: &str = "You answer questions using only the provided excerpts from the \
user's documents. If the excerpts do not contain the answer, say that you don't know. \
Keep the answer concise.";

/// Conversational question answering over the user's uploaded documents.
pub struct DocumentQaAgent {
    llm: Arc<dyn LLMClient>,
    index: Option<Arc<dyn DocumentIndex>>,
    top_k: usize,
    history_window: usize,
}

impl DocumentQaAgent {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        index: Option<Arc<dyn DocumentIndex>>,
        top_k: usize,
        history_window: usize,
    ) -> Self {
        Self {
            llm,
            index,
            top_k,
            history_window,
        }
    }

    fn ready_index(&self) -> Result<&Arc<dyn DocumentIndex>> {
        match &self.index {
            Some(index) if !index.is_empty() => Ok(index),
            _ => Err(AppError::NotReady(
                "document knowledge base is not initialized".to_string(),
            )),
        }
    }

    /// Retrieve passages and ask the model for an answer grounded in them.
    pub async fn answer(&self, question: &str, context: &ToolContext<'_>) -> Result<String> {
        let index = self.ready_index()?;
        let passages = index.search(question, self.top_k).await?;
        tracing::debug!(passages = passages.len(), "Retrieved document passages");

        let mut messages = vec![("system".to_string(), SYSTEM_PROMPT.to_string())];
        let start = context.history.len().saturating_sub(self.history_window);
        for turn in &context.history[start..] {
            if turn.role() != Role::Tool {
                messages.push((turn.role().as_str().to_string(), turn.content().to_string()));
            }
        }
        messages.push(("user".to_string(), build_prompt(question, &passages)));

        self.llm.generate_with_history(&messages).await
    }
}

fn build_prompt(question: &str, passages: &[Passage]) -> String {
    let mut prompt = String::from("Excerpts:\n");
    for passage in passages {
        prompt.push_str(&format!("[{}]\n{}\n\n", passage.source, passage.text));
    }
    prompt.push_str(&format!("Question: {}", question));
    prompt
}

/// True when the answer is empty or admits the documents had nothing.
pub fn is_not_found(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    lower.trim().is_empty() || NOT_FOUND_PHRASES.iter().any(|p| lower.contains(p))
}

#[async_trait]
impl Tool for DocumentQaAgent {
    fn name(&self) -> &str {
        DOCUMENT_KNOWLEDGE_BASE
    }

    fn description(&self) -> &str {
        "Use this tool ONLY for questions about the user's uploaded files. \
         This is for querying unstructured text the user has provided."
    }

    async fn invoke(&self, argument: &str, context: &ToolContext<'_>) -> String {
        match self.answer(argument, context).await {
            Ok(answer) if is_not_found(&answer) => {
                tracing::warn!(query = argument, "Documents had no answer");
                format!(
                    "The documents do not contain specific information about: '{}'. \
                     Tell the user you couldn't find the answer in their files.",
                    argument
                )
            }
            Ok(answer) => answer,
            Err(AppError::NotReady(_)) => NOT_READY.to_string(),
            Err(e) => format!("Error occurred while searching documents: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::test_support::{context, ScriptedLlm};
    use crate::rag::KnowledgeBase;

    fn knowledge_base() -> Arc<dyn DocumentIndex> {
        let mut kb = KnowledgeBase::new(50, 10);
        kb.add_text("leave.txt", "Employees receive twenty days of paid annual leave.");
        Arc::new(kb)
    }

    #[tokio::test]
    async fn test_missing_index_is_not_ready() {
        let llm = ScriptedLlm::new(["unused"]);
        let agent = DocumentQaAgent::new(llm.clone(), None, 4, 20);

        let output = agent.invoke("How much leave?", &context(&[])).await;
        assert_eq!(output, NOT_READY);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_index_is_not_ready() {
        let llm = ScriptedLlm::new(["unused"]);
        let empty: Arc<dyn DocumentIndex> = Arc::new(KnowledgeBase::new(50, 10));
        let agent = DocumentQaAgent::new(llm, Some(empty), 4, 20);

        assert_eq!(agent.invoke("anything", &context(&[])).await, NOT_READY);
    }

    #[tokio::test]
    async fn test_answer_includes_passages() {
        let llm = ScriptedLlm::new(["Twenty days."]);
        let agent = DocumentQaAgent::new(llm.clone(), Some(knowledge_base()), 4, 20);

        let output = agent.invoke("How much annual leave?", &context(&[])).await;
        assert_eq!(output, "Twenty days.");
        assert!(llm.last_prompt().contains("twenty days of paid annual leave"));
    }

    #[tokio::test]
    async fn test_sentinel_answer_becomes_not_found_message() {
        let llm = ScriptedLlm::new(["I don't know based on these files."]);
        let agent = DocumentQaAgent::new(llm, Some(knowledge_base()), 4, 20);

        let output = agent.invoke("What is the wifi password?", &context(&[])).await;
        assert!(output.starts_with(
            "The documents do not contain specific information about: 'What is the wifi password?'"
        ));
    }

    #[tokio::test]
    async fn test_llm_failure_is_rendered() {
        let llm = ScriptedLlm::failing();
        let agent = DocumentQaAgent::new(llm, Some(knowledge_base()), 4, 20);

        let output = agent.invoke("annual leave", &context(&[])).await;
        assert!(output.starts_with("Error occurred while searching documents:"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(is_not_found(""));
        assert!(is_not_found("There is NO INFORMATION about that."));
        assert!(!is_not_found("Twenty days."));
    }
}
