//! Mock implementations for testing.
//!
//! Scripted LLM client and stub services shared by the integration tests,
//! so every test file builds the same assistant without network access.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use switchboard::agents::{build_registry, ToolDependencies};
use switchboard::db::{Event, EventSource, QueryResult, SqlStore};
use switchboard::llm::LLMClient;
use switchboard::services::weather::{Condition, CurrentConditions, WeatherLocation};
use switchboard::services::{CurrentWeather, ImageService, SearchHit, SearchService, WeatherService};
use switchboard::tools::ToolRegistry;
use switchboard::types::{AppError, Result};

/// Mock LLM client that replays responses in order.
///
/// The last response repeats once the script runs out, so a single-entry
/// script answers every call the same way.
///
/// # Examples
///
/// ```ignore
/// let llm = MockLLMClient::new(r#"{"action": "WebSearch", "action_input": "rust"}"#);
/// let llm = MockLLMClient::scripted(&["first", "second"]);
/// let llm = MockLLMClient::failing();
/// ```
#[derive(Clone)]
pub struct MockLLMClient {
    responses: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<AtomicUsize>,
    should_fail: bool,
}

impl MockLLMClient {
    pub fn new(response: &str) -> Self {
        Self::scripted(&[response])
    }

    pub fn scripted(responses: &[&str]) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.iter().map(|r| r.to_string()).collect(),
            )),
            calls: Arc::new(AtomicUsize::new(0)),
            should_fail: false,
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            should_fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            Ok(responses.pop_front().unwrap())
        } else {
            responses
                .front()
                .cloned()
                .ok_or_else(|| AppError::LLM("Mock script is empty".to_string()))
        }
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.next()
    }

    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        self.next()
    }

    async fn generate_with_history(&self, _messages: &[(String, String)]) -> Result<String> {
        self.next()
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Always reports 21°C and sunny in the requested place.
pub struct SunnyWeather;

#[async_trait]
impl WeatherService for SunnyWeather {
    async fn current(&self, location: &str) -> Result<CurrentWeather> {
        Ok(CurrentWeather {
            location: WeatherLocation {
                name: location.to_string(),
                region: String::new(),
                country: location.to_string(),
            },
            current: CurrentConditions {
                temp_c: 21.0,
                temp_f: 69.8,
                condition: Condition {
                    text: "Sunny".to_string(),
                },
            },
        })
    }
}

pub struct FixedImage(pub &'static str);

#[async_trait]
impl ImageService for FixedImage {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Echoes the query back as a single hit.
pub struct EchoSearch;

#[async_trait]
impl SearchService for EchoSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        Ok(vec![SearchHit {
            title: format!("About {}", query),
            url: "https://example.com".to_string(),
            description: query.to_string(),
        }])
    }
}

/// A company store with no rows.
pub struct EmptyStore;

#[async_trait]
impl SqlStore for EmptyStore {
    async fn query(&self, _sql: &str) -> Result<QueryResult> {
        Ok(QueryResult::default())
    }
}

/// Returns the same events for any date.
pub struct FixedEvents(pub Vec<Event>);

#[async_trait]
impl EventSource for FixedEvents {
    async fn events_on(&self, _date: NaiveDate, _event_type: Option<&str>) -> Result<Vec<Event>> {
        Ok(self.0.clone())
    }
}

pub fn sample_event() -> Event {
    Event {
        id: 1,
        name: "Jazz in the Park".to_string(),
        event_type: "outdoor".to_string(),
        description: "Live jazz on the lawn".to_string(),
        location: "Botanic Gardens".to_string(),
        date: "2025-10-26".to_string(),
    }
}

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 26).unwrap()
}

/// Dependencies wired to the stubs above.
pub fn stub_dependencies(llm: Arc<dyn LLMClient>) -> ToolDependencies {
    ToolDependencies::new(
        llm,
        Arc::new(SunnyWeather),
        Arc::new(FixedImage("https://images.example.com/cat.png")),
        Arc::new(EchoSearch),
        Arc::new(EmptyStore),
        Arc::new(FixedEvents(vec![sample_event()])),
    )
}

/// The default six-tool registry over stub services.
pub fn stub_registry(llm: Arc<dyn LLMClient>) -> ToolRegistry {
    build_registry(&stub_dependencies(llm)).unwrap()
}
