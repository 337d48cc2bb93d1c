use crate::llm::LLMClient;
use crate::memory::{estimate_tokens, ConversationState};
use crate::tools::{
    DATABASE_QUERY, DOCUMENT_KNOWLEDGE_BASE, EVENT_RECOMMENDER, CURRENT_WEATHER, IMAGE_GENERATOR,
    WEB_SEARCH,
};
use crate::types::{AppError, Result, Role, RoutingDecision, ToolDefinition};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Marker the model uses instead of a tool name to answer directly.
pub const FINAL_ANSWER: &str = "Final Answer";

const NO_OBSERVATIONS: &str =
    "I wasn't able to reach an answer within the allowed number of steps.";

/// Decides the next step of a turn.
#[async_trait]
pub trait RoutingPolicy: Send + Sync {
    /// Pick at most one tool to run next, or answer.
    ///
    /// # Errors
    ///
    /// [`AppError::Parse`] when the decision cannot be mapped to a known tool
    /// or a final answer; [`AppError::LLM`] when the model is unreachable.
    async fn decide(
        &self,
        state: &ConversationState,
        tools: &[ToolDefinition],
    ) -> Result<RoutingDecision>;

    /// Best-effort answer once the turn budget is spent.
    async fn synthesize(&self, state: &ConversationState) -> String {
        default_synthesis(state)
    }
}

/// The observations gathered for the current message, joined.
pub fn default_synthesis(state: &ConversationState) -> String {
    let observations: Vec<&str> = state
        .current_observations()
        .iter()
        .filter(|t| t.role() == Role::Tool)
        .map(|t| t.content())
        .collect();

    if observations.is_empty() {
        NO_OBSERVATIONS.to_string()
    } else {
        observations.join("\n\n")
    }
}

/// The fixed priority table shown to the routing model.
pub fn priority_instructions() -> String {
    format!(
        "You are a helpful, multi-function assistant. You must follow this priority list for every user query:\n\n\
         1. Check for Document Question: Is the user asking a specific question about their uploaded documents? \
         If YES, you MUST use the `{DOCUMENT_KNOWLEDGE_BASE}` tool.\n\
         2. Check for Database Question: Is the user asking about employees, departments, salaries or budgets? \
         If YES, you MUST use the `{DATABASE_QUERY}` tool.\n\
         3. Check for Event Recommendation: Is the user asking for event recommendations, 'what to do' or \
         'things to do' for today? If YES, you MUST use the `{EVENT_RECOMMENDER}` tool.\n\
         4. Check for only Weather: Is the user asking just for the current weather? \
         If YES, you MUST use the `{CURRENT_WEATHER}` tool.\n\
         5. Check for Image Request: Is the user asking to create or draw an image? \
         If YES, you MUST use the `{IMAGE_GENERATOR}` tool.\n\
         6. General Knowledge (Fallback): If the request is a general question NOT covered by any other tool \
         and needs external knowledge, you MUST use the `{WEB_SEARCH}` tool.\n\
         7. No Tool: If you can answer without any tools (like 'hello'), do so directly.\n\n\
         When several rules match, the earlier rule wins."
    )
}

fn tool_catalog(tools: &[ToolDefinition]) -> String {
    let mut catalog = String::from("Available tools:\n");
    for tool in tools {
        catalog.push_str(&format!("- {}: {}\n", tool.name, tool.description));
    }
    catalog
}

const REPLY_FORMAT: &str = "Reply with a single JSON object and nothing else:\n\
{\"action\": \"<tool name>\", \"action_input\": \"<input for the tool>\"}\n\
or, to answer the user directly:\n\
{\"action\": \"Final Answer\", \"action_input\": \"<your answer>\"}\n\
Use at most one tool per reply. After an observation, either call another tool or give the \
Final Answer based on it.";

/// Routing delegated to the language model.
pub struct LlmRoutingPolicy {
    llm: Arc<dyn LLMClient>,
    history_window: usize,
}

impl LlmRoutingPolicy {
    pub fn new(llm: Arc<dyn LLMClient>, history_window: usize) -> Self {
        Self {
            llm,
            history_window,
        }
    }

    fn history_messages(&self, state: &ConversationState) -> Vec<(String, String)> {
        state
            .recent(self.history_window)
            .iter()
            .map(|turn| match turn.role() {
                Role::Tool => (
                    "user".to_string(),
                    format!(
                        "Observation from {}: {}",
                        turn.tool_name().unwrap_or("tool"),
                        turn.content()
                    ),
                ),
                role => (role.as_str().to_string(), turn.content().to_string()),
            })
            .collect()
    }

    fn build_messages(
        &self,
        state: &ConversationState,
        tools: &[ToolDefinition],
    ) -> Vec<(String, String)> {
        let system = format!(
            "{}\n\n{}\n{}",
            priority_instructions(),
            tool_catalog(tools),
            REPLY_FORMAT
        );

        let mut messages = vec![("system".to_string(), system)];
        messages.extend(self.history_messages(state));
        if !state.scratchpad().is_empty() {
            messages.push((
                "user".to_string(),
                format!("Steps taken so far:\n{}", state.scratchpad()),
            ));
        }
        messages
    }
}

#[async_trait]
impl RoutingPolicy for LlmRoutingPolicy {
    async fn decide(
        &self,
        state: &ConversationState,
        tools: &[ToolDefinition],
    ) -> Result<RoutingDecision> {
        let messages = self.build_messages(state, tools);
        let prompt_tokens: usize = messages.iter().map(|(_, c)| estimate_tokens(c)).sum();
        tracing::debug!(messages = messages.len(), prompt_tokens, "Requesting routing decision");

        let raw = self.llm.generate_with_history(&messages).await?;
        tracing::debug!(%raw, "Routing model output");
        parse_decision(&raw, tools)
    }

    async fn synthesize(&self, state: &ConversationState) -> String {
        let mut messages = vec![(
            "system".to_string(),
            "Answer the user's latest message using only the observations in the conversation. \
             Do not call any tools. Reply with the answer text only."
                .to_string(),
        )];
        messages.extend(self.history_messages(state));

        match self.llm.generate_with_history(&messages).await {
            Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            Ok(_) => default_synthesis(state),
            Err(e) => {
                tracing::warn!(error = %e, "Synthesis failed, returning raw observations");
                default_synthesis(state)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct DecisionReply {
    action: String,
    #[serde(default)]
    action_input: serde_json::Value,
}

/// Map raw model output onto a [`RoutingDecision`].
///
/// Accepts a JSON `{"action", "action_input"}` object (optionally fenced or
/// surrounded by prose) or the `Action:` / `Action Input:` / `Final Answer:`
/// line format. Tool names match case-insensitively.
pub fn parse_decision(raw: &str, tools: &[ToolDefinition]) -> Result<RoutingDecision> {
    let text = strip_fences(raw);

    if let Some(reply) = extract_json(&text) {
        let input = match reply.action_input {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        return resolve(&reply.action, input, tools);
    }

    if let Some(answer) = field(&text, "final answer:") {
        return Ok(RoutingDecision::FinalAnswer(answer));
    }
    if let Some(action) = field_line(&text, "action:") {
        let input = field_line(&text, "action input:").unwrap_or_default();
        return resolve(&action, input, tools);
    }

    Err(AppError::Parse(format!(
        "expected a JSON action object, got: {}",
        raw.trim()
    )))
}

fn strip_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_json(text: &str) -> Option<DecisionReply> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Everything after `label` (case-insensitive) up to the end of the text.
fn field(text: &str, label: &str) -> Option<String> {
    text.char_indices().find_map(|(at, _)| {
        let end = at + label.len();
        let head = text.get(at..end)?;
        head.eq_ignore_ascii_case(label)
            .then(|| text[end..].trim().to_string())
    })
}

/// The remainder of the first line starting with `label` (case-insensitive).
fn field_line(text: &str, label: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let trimmed = line.trim();
        let head = trimmed.get(..label.len())?;
        if head.eq_ignore_ascii_case(label) {
            Some(trimmed[label.len()..].trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

fn resolve(action: &str, input: String, tools: &[ToolDefinition]) -> Result<RoutingDecision> {
    let action = action.trim().trim_matches(|c| c == '`' || c == '"' || c == '\'');

    if action.eq_ignore_ascii_case(FINAL_ANSWER) {
        return Ok(RoutingDecision::FinalAnswer(input));
    }

    tools
        .iter()
        .find(|tool| tool.name.eq_ignore_ascii_case(action))
        .map(|tool| RoutingDecision::Invoke {
            tool: tool.name.clone(),
            argument: input,
        })
        .ok_or_else(|| AppError::Parse(format!("unknown tool '{}'", action)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::test_support::ScriptedLlm;

    fn tools() -> Vec<ToolDefinition> {
        [WEB_SEARCH, CURRENT_WEATHER]
            .iter()
            .map(|name| ToolDefinition {
                name: name.to_string(),
                description: "test".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_parse_json_invoke() {
        let decision = parse_decision(
            r#"{"action": "CurrentWeather", "action_input": "Paris"}"#,
            &tools(),
        )
        .unwrap();
        assert_eq!(
            decision,
            RoutingDecision::Invoke {
                tool: "CurrentWeather".into(),
                argument: "Paris".into()
            }
        );
    }

    #[test]
    fn test_parse_fenced_json_with_prose_and_case() {
        let raw = "Sure, here you go:\n```json\n{\"action\": \"currentweather\", \"action_input\": \"Oslo\"}\n```";
        let decision = parse_decision(raw, &tools()).unwrap();
        assert_eq!(
            decision,
            RoutingDecision::Invoke {
                tool: "CurrentWeather".into(),
                argument: "Oslo".into()
            }
        );
    }

    #[test]
    fn test_parse_json_final_answer() {
        let decision = parse_decision(
            r#"{"action": "Final Answer", "action_input": "Hello!"}"#,
            &tools(),
        )
        .unwrap();
        assert_eq!(decision, RoutingDecision::FinalAnswer("Hello!".into()));
    }

    #[test]
    fn test_parse_line_format() {
        let raw = "Thought: need the weather\nAction: CurrentWeather\nAction Input: \"Lima\"";
        assert_eq!(
            parse_decision(raw, &tools()).unwrap(),
            RoutingDecision::Invoke {
                tool: "CurrentWeather".into(),
                argument: "Lima".into()
            }
        );

        let raw = "Thought: easy\nFinal Answer: Hi there.\nHow can I help?";
        assert_eq!(
            parse_decision(raw, &tools()).unwrap(),
            RoutingDecision::FinalAnswer("Hi there.\nHow can I help?".into())
        );
    }

    #[test]
    fn test_final_answer_after_non_ascii_prose() {
        let raw = "İİİ İstanbul plan first.\nFinal Answer: Go in spring";
        assert_eq!(
            parse_decision(raw, &tools()).unwrap(),
            RoutingDecision::FinalAnswer("Go in spring".into())
        );

        let raw = "Straße ÄÖÜ İ\nFINAL ANSWER: Take the U-Bahn";
        assert_eq!(
            parse_decision(raw, &tools()).unwrap(),
            RoutingDecision::FinalAnswer("Take the U-Bahn".into())
        );
    }

    #[test]
    fn test_unknown_tool_is_parse_error() {
        let result = parse_decision(r#"{"action": "Calculator", "action_input": "1+1"}"#, &tools());
        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[test]
    fn test_unregistered_known_tool_is_parse_error() {
        let result = parse_decision(
            r#"{"action": "DatabaseQuery", "action_input": "x"}"#,
            &tools(),
        );
        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[test]
    fn test_free_text_is_parse_error() {
        let result = parse_decision("I think it will rain.", &tools());
        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[test]
    fn test_instructions_name_every_tool_in_priority_order() {
        let instructions = priority_instructions();
        let positions: Vec<usize> = crate::tools::PRIORITY_ORDER
            .iter()
            .map(|name| instructions.find(name).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[tokio::test]
    async fn test_prompt_contains_catalog_and_observations() {
        let llm = ScriptedLlm::new([r#"{"action": "Final Answer", "action_input": "Sunny."}"#]);
        let policy = LlmRoutingPolicy::new(llm.clone(), 20);

        let mut state = ConversationState::new();
        state.push_user("weather in Paris?");
        state.push_tool("CurrentWeather", "Sunny");
        state.note("Invoked CurrentWeather with 'Paris'");

        let decision = policy.decide(&state, &tools()).await.unwrap();
        assert_eq!(decision, RoutingDecision::FinalAnswer("Sunny.".into()));

        let prompt = llm.last_prompt();
        assert!(prompt.contains("- WebSearch: test"));
        assert!(prompt.contains("Observation from CurrentWeather: Sunny"));
        assert!(prompt.contains("Invoked CurrentWeather with 'Paris'"));
    }

    #[tokio::test]
    async fn test_synthesis_falls_back_to_observations() {
        let policy = LlmRoutingPolicy::new(ScriptedLlm::failing(), 20);

        let mut state = ConversationState::new();
        state.push_user("weather?");
        state.push_tool("CurrentWeather", "Sunny");
        state.push_tool("WebSearch", "Warm week ahead");

        assert_eq!(policy.synthesize(&state).await, "Sunny\n\nWarm week ahead");
    }

    #[test]
    fn test_default_synthesis_without_observations() {
        let mut state = ConversationState::new();
        state.push_user("hello");
        assert_eq!(default_synthesis(&state), NO_OBSERVATIONS);
    }
}
