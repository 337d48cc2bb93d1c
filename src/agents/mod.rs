//! Sub-agents, routing and the agent loop.
//!
//! Each sub-agent is a [`Tool`](crate::tools::Tool) that turns its own
//! failures into observation text:
//! - [`documents`] - question answering over uploaded files
//! - [`database`] - SQL generation and execution over the company store
//! - [`events`] - weather-aware event recommendations for today
//! - [`weather`] - current conditions
//! - [`image`] - prompt engineering plus image generation
//! - [`search`] - web search fallback
//!
//! [`router`] and [`rules`] hold the two [`RoutingPolicy`] implementations,
//! [`agent_loop`] drives a single user message and [`session`] keeps the
//! conversation between messages.

pub mod agent_loop;
pub mod database;
pub mod documents;
pub mod events;
pub mod image;
pub mod router;
pub mod rules;
pub mod search;
pub mod session;
pub mod weather;

pub use agent_loop::{AgentLoop, DEFAULT_TURN_BUDGET};
pub use router::{LlmRoutingPolicy, RoutingPolicy};
pub use rules::RuleBasedRoutingPolicy;
pub use session::ChatSession;

use crate::db::{EventSource, SqlStore};
use crate::llm::LLMClient;
use crate::memory::DEFAULT_HISTORY_WINDOW;
use crate::rag::DocumentIndex;
use crate::services::{ImageService, SearchService, WeatherService};
use crate::tools::ToolRegistry;
use crate::types::{AppError, Result};
use std::sync::Arc;

/// Everything the built-in tools talk to.
#[derive(Clone)]
pub struct ToolDependencies {
    pub llm: Arc<dyn LLMClient>,
    pub weather: Arc<dyn WeatherService>,
    pub images: Arc<dyn ImageService>,
    pub search: Arc<dyn SearchService>,
    pub company: Arc<dyn SqlStore>,
    pub events: Arc<dyn EventSource>,
    pub documents: Option<Arc<dyn DocumentIndex>>,
    pub document_top_k: usize,
    pub history_window: usize,
}

impl ToolDependencies {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        weather: Arc<dyn WeatherService>,
        images: Arc<dyn ImageService>,
        search: Arc<dyn SearchService>,
        company: Arc<dyn SqlStore>,
        events: Arc<dyn EventSource>,
    ) -> Self {
        Self {
            llm,
            weather,
            images,
            search,
            company,
            events,
            documents: None,
            document_top_k: 4,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    pub fn with_documents(mut self, index: Arc<dyn DocumentIndex>) -> Self {
        self.documents = Some(index);
        self
    }
}

/// Register the six built-in tools in priority order.
pub fn build_registry(deps: &ToolDependencies) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(documents::DocumentQaAgent::new(
        deps.llm.clone(),
        deps.documents.clone(),
        deps.document_top_k,
        deps.history_window,
    )))?;
    registry.register(Arc::new(database::DatabaseAgent::new(
        deps.llm.clone(),
        deps.company.clone(),
    )))?;
    registry.register(Arc::new(events::EventRecommender::new(
        deps.weather.clone(),
        deps.events.clone(),
        deps.llm.clone(),
    )))?;
    registry.register(Arc::new(weather::WeatherLookupAgent::new(deps.weather.clone())))?;
    registry.register(Arc::new(image::ImageAgent::new(
        deps.llm.clone(),
        deps.images.clone(),
    )))?;
    registry.register(Arc::new(search::WebSearchAgent::new(deps.search.clone())))?;

    tracing::debug!(tools = ?registry.tool_names(), "Tool registry built");
    Ok(registry)
}

/// The upstream message of a service failure, without the variant prefix.
pub(crate) fn upstream_message(error: AppError) -> String {
    match error {
        AppError::Service(msg) | AppError::NotFound(msg) => msg,
        other => other.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::db::{Event, EventSource};
    use crate::llm::LLMClient;
    use crate::services::weather::{Condition, CurrentConditions, WeatherLocation};
    use crate::services::{CurrentWeather, ImageService, SearchHit, SearchService, WeatherService};
    use crate::tools::ToolContext;
    use crate::types::{AppError, Result, Turn};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    pub fn context(history: &[Turn]) -> ToolContext<'_> {
        context_on(history, NaiveDate::from_ymd_opt(2025, 10, 26).unwrap())
    }

    pub fn context_on(history: &[Turn], today: NaiveDate) -> ToolContext<'_> {
        ToolContext { history, today }
    }

    /// LLM client that replays canned responses in order.
    pub struct ScriptedLlm {
        responses: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl ScriptedLlm {
        pub fn new<'a>(responses: impl IntoIterator<Item = &'a str>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                fail: false,
            })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(VecDeque::new()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                fail: true,
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Every message of the latest call, joined.
        pub fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }

        fn respond(&self, prompt: String) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt);
            if self.fail {
                return Err(AppError::LLM("model unavailable".to_string()));
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AppError::LLM("script exhausted".to_string()))
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.respond(prompt.to_string())
        }

        async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
            self.respond(format!("{}\n{}", system, prompt))
        }

        async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
            let joined = messages
                .iter()
                .map(|(_, content)| content.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            self.respond(joined)
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    pub struct StubWeather {
        result: std::result::Result<CurrentWeather, String>,
        not_found: bool,
    }

    impl StubWeather {
        pub fn reporting(name: &str, region: &str, country: &str) -> Self {
            Self {
                result: Ok(CurrentWeather {
                    location: WeatherLocation {
                        name: name.to_string(),
                        region: region.to_string(),
                        country: country.to_string(),
                    },
                    current: CurrentConditions {
                        temp_c: 21.0,
                        temp_f: 69.8,
                        condition: Condition {
                            text: "Sunny".to_string(),
                        },
                    },
                }),
                not_found: false,
            }
        }

        pub fn sunny(name: &str) -> Self {
            Self::reporting(name, "", name)
        }

        pub fn failing(error: AppError) -> Self {
            let not_found = matches!(error, AppError::NotFound(_));
            let message = match error {
                AppError::Service(m) | AppError::NotFound(m) => m,
                other => other.to_string(),
            };
            Self {
                result: Err(message),
                not_found,
            }
        }
    }

    #[async_trait]
    impl WeatherService for StubWeather {
        async fn current(&self, _location: &str) -> Result<CurrentWeather> {
            match &self.result {
                Ok(weather) => Ok(weather.clone()),
                Err(m) if self.not_found => Err(AppError::NotFound(m.clone())),
                Err(m) => Err(AppError::Service(m.clone())),
            }
        }
    }

    #[derive(Clone)]
    pub struct StubEvents {
        events: Vec<Event>,
        requested: Arc<Mutex<Vec<NaiveDate>>>,
    }

    impl StubEvents {
        pub fn new(events: Vec<Event>) -> Self {
            Self {
                events,
                requested: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn requested_dates(&self) -> Vec<NaiveDate> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventSource for StubEvents {
        async fn events_on(&self, date: NaiveDate, _event_type: Option<&str>) -> Result<Vec<Event>> {
            self.requested.lock().unwrap().push(date);
            Ok(self.events.clone())
        }
    }

    #[derive(Clone)]
    pub struct StubImages {
        url: std::result::Result<String, String>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl StubImages {
        pub fn returning(url: &str) -> Self {
            Self {
                url: Ok(url.to_string()),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn failing(error: AppError) -> Self {
            let message = match error {
                AppError::Service(m) => m,
                other => other.to_string(),
            };
            Self {
                url: Err(message),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageService for StubImages {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.url.clone().map_err(AppError::Service)
        }
    }

    pub struct StubSearch {
        hits: Vec<SearchHit>,
    }

    impl StubSearch {
        pub fn with_hits(hits: Vec<SearchHit>) -> Self {
            Self { hits }
        }
    }

    #[async_trait]
    impl SearchService for StubSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
            Ok(self.hits.clone())
        }
    }
}
