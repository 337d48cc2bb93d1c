//! Deterministic keyword routing.
//!
//! Mirrors the priority table of the model-driven policy without calling a
//! model, so the assistant can run offline and tests get stable decisions.

use super::router::RoutingPolicy;
use crate::memory::ConversationState;
use crate::tools::{
    CURRENT_WEATHER, DATABASE_QUERY, DOCUMENT_KNOWLEDGE_BASE, EVENT_RECOMMENDER, IMAGE_GENERATOR,
    WEB_SEARCH,
};
use crate::types::{AppError, Result, Role, RoutingDecision, ToolDefinition};
use async_trait::async_trait;

// Matched as whole words, so "event" does not fire on "prevent".
const DOCUMENT_HINTS: &[&str] = &[
    "document", "documents", "my file", "my files", "uploaded", "pdf", "my notes",
];
const DATABASE_HINTS: &[&str] = &[
    "employee", "employees", "department", "departments", "salary", "salaries", "budget",
    "budgets",
];
const EVENT_HINTS: &[&str] = &["things to do", "what to do", "event", "events"];
const WEATHER_HINTS: &[&str] = &["weather", "temperature", "forecast"];
const IMAGE_HINTS: &[&str] = &[
    "draw", "drawing", "image", "images", "picture", "pictures", "sketch", "paint",
];

const QUESTION_WORDS: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "which", "is", "are", "does", "do", "can",
    "tell", "explain",
];
const GREETINGS: &[&str] = &["hi", "hello", "hey", "good morning", "good evening"];
const THANKS: &[&str] = &["thanks", "thank you", "cheers"];

const LOCATION_PREPOSITIONS: &[&str] = &["in", "for", "at"];
const TIME_WORDS: &[&str] = &[
    "today", "tonight", "now", "right", "currently", "this", "morning", "afternoon", "evening",
    "weekend",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedRoutingPolicy;

impl RuleBasedRoutingPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Which rule of the table a message matches, if any.
    fn matches(tool: &str, message: &str) -> bool {
        let lower = message.to_lowercase();
        let any = |hints: &[&str]| hints.iter().any(|h| contains_word(&lower, h));
        match tool {
            DOCUMENT_KNOWLEDGE_BASE => any(DOCUMENT_HINTS),
            DATABASE_QUERY => any(DATABASE_HINTS),
            EVENT_RECOMMENDER => any(EVENT_HINTS),
            CURRENT_WEATHER => any(WEATHER_HINTS),
            IMAGE_GENERATOR => any(IMAGE_HINTS),
            WEB_SEARCH => is_question(&lower) && !is_small_talk(&lower),
            _ => false,
        }
    }

    fn argument(tool: &str, message: &str) -> String {
        match tool {
            CURRENT_WEATHER | EVENT_RECOMMENDER => {
                extract_location(message).unwrap_or_else(|| message.trim().to_string())
            }
            _ => message.trim().to_string(),
        }
    }
}

/// True when `phrase` occurs in `text` with no letter or digit on either side.
fn contains_word(text: &str, phrase: &str) -> bool {
    text.match_indices(phrase).any(|(at, _)| {
        let before = text[..at].chars().next_back();
        let after = text[at + phrase.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

fn starts_with_word(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| {
        text.strip_prefix(w)
            .map(|rest| rest.is_empty() || !rest.starts_with(|c: char| c.is_alphanumeric()))
            .unwrap_or(false)
    })
}

fn is_question(lower: &str) -> bool {
    let trimmed = lower.trim();
    trimmed.ends_with('?') || starts_with_word(trimmed, QUESTION_WORDS)
}

fn is_small_talk(lower: &str) -> bool {
    let trimmed = lower.trim();
    starts_with_word(trimmed, GREETINGS) || starts_with_word(trimmed, THANKS)
}

fn direct_reply(message: &str) -> String {
    let lower = message.trim().to_lowercase();
    if starts_with_word(&lower, THANKS) {
        "You're welcome!".to_string()
    } else if starts_with_word(&lower, GREETINGS) {
        "Hello! How can I help you today?".to_string()
    } else {
        "I can help with your documents, the company database, the weather, events, \
         images and web searches. What would you like to know?"
            .to_string()
    }
}

/// The place named after the last "in"/"for"/"at" in `message`, without
/// trailing time words such as "today".
pub fn extract_location(message: &str) -> Option<String> {
    let words: Vec<&str> = message
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect();

    words
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, w)| {
            LOCATION_PREPOSITIONS
                .iter()
                .any(|p| w.eq_ignore_ascii_case(p))
        })
        .find_map(|(i, _)| {
            let mut rest = &words[i + 1..];
            while let Some((last, init)) = rest.split_last() {
                if TIME_WORDS.iter().any(|t| last.eq_ignore_ascii_case(t)) {
                    rest = init;
                } else {
                    break;
                }
            }
            (!rest.is_empty()).then(|| rest.join(" "))
        })
}

#[async_trait]
impl RoutingPolicy for RuleBasedRoutingPolicy {
    async fn decide(
        &self,
        state: &ConversationState,
        tools: &[ToolDefinition],
    ) -> Result<RoutingDecision> {
        if let Some(observation) = state
            .current_observations()
            .iter()
            .rev()
            .find(|t| t.role() == Role::Tool)
        {
            return Ok(RoutingDecision::FinalAnswer(observation.content().to_string()));
        }

        let message = state
            .last_user_message()
            .ok_or_else(|| AppError::Parse("no user message to route".to_string()))?;

        let decision = tools
            .iter()
            .find(|tool| Self::matches(&tool.name, message))
            .map(|tool| RoutingDecision::Invoke {
                tool: tool.name.clone(),
                argument: Self::argument(&tool.name, message),
            })
            .unwrap_or_else(|| RoutingDecision::FinalAnswer(direct_reply(message)));

        Ok(decision)
    }
}
