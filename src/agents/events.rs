//! Event recommendations for today.
//!
//! The [`EventRecommender`] tool runs a three-stage pipeline:
//! 1. [`WeatherAgent`] fetches current conditions for the location
//! 2. [`EventAgent`] reads today's events from the event store
//! 3. [`RecommendationAgent`] asks the model to weigh indoor and outdoor
//!    events against the weather
//!
//! Any stage failure ends the pipeline with a single `Error: ...` line.

use crate::db::{Event, EventSource};
use crate::llm::LLMClient;
use crate::services::{CurrentWeather, WeatherService};
use crate::tools::{Tool, ToolContext, EVENT_RECOMMENDER};
use crate::types::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

pub const NO_EVENTS: &str = "No events found for this date.";

const RECOMMENDER_PROMPT: &str = "You are a helpful event recommender. Consider the weather \
conditions and suggest suitable events. For outdoor events, consider the temperature and \
weather conditions. Be specific about why you recommend certain events over others. Keep your \
response concise but informative. If weather data is unavailable, focus on providing a \
balanced recommendation of both indoor and outdoor events.";

pub struct WeatherAgent {
    weather: Arc<dyn WeatherService>,
}

impl WeatherAgent {
    pub fn new(weather: Arc<dyn WeatherService>) -> Self {
        Self { weather }
    }

    pub async fn get_weather(&self, location: &str) -> Result<CurrentWeather> {
        self.weather.current(location).await
    }
}

pub struct EventAgent {
    events: Arc<dyn EventSource>,
}

impl EventAgent {
    pub fn new(events: Arc<dyn EventSource>) -> Self {
        Self { events }
    }

    pub async fn get_events(&self, date: NaiveDate, event_type: Option<&str>) -> Result<Vec<Event>> {
        self.events.events_on(date, event_type).await
    }
}

pub struct RecommendationAgent {
    llm: Arc<dyn LLMClient>,
}

impl RecommendationAgent {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    pub async fn recommend(&self, weather: &CurrentWeather, events: &[Event]) -> Result<String> {
        let context = recommendation_context(weather, events);
        tracing::debug!(%context, "Recommendation context");
        self.llm
            .generate_with_system(RECOMMENDER_PROMPT, &context)
            .await
    }
}

pub fn recommendation_context(weather: &CurrentWeather, events: &[Event]) -> String {
    let mut context = format!(
        "Weather: {}, Temperature: {:.1}°C\n\nAvailable events:\n",
        weather.current.condition.text, weather.current.temp_c
    );
    for event in events {
        context.push_str(&format!(
            "- {} ({}): {} at {}\n",
            event.name, event.event_type, event.description, event.location
        ));
    }
    context
}

/// Coordinates the weather, event and recommendation stages.
pub struct EventRecommender {
    weather_agent: WeatherAgent,
    event_agent: EventAgent,
    recommendation_agent: RecommendationAgent,
}

impl EventRecommender {
    pub fn new(
        weather: Arc<dyn WeatherService>,
        events: Arc<dyn EventSource>,
        llm: Arc<dyn LLMClient>,
    ) -> Self {
        Self {
            weather_agent: WeatherAgent::new(weather),
            event_agent: EventAgent::new(events),
            recommendation_agent: RecommendationAgent::new(llm),
        }
    }

    pub async fn get_recommendations(&self, location: &str, date: NaiveDate) -> Result<String> {
        tracing::info!(location, %date, "Fetching weather for recommendations");
        let weather = self.weather_agent.get_weather(location).await?;

        let events = self.event_agent.get_events(date, None).await?;
        if events.is_empty() {
            return Ok(NO_EVENTS.to_string());
        }

        tracing::info!(events = events.len(), "Generating recommendations");
        self.recommendation_agent.recommend(&weather, &events).await
    }
}

#[async_trait]
impl Tool for EventRecommender {
    fn name(&self) -> &str {
        EVENT_RECOMMENDER
    }

    fn description(&self) -> &str {
        "Use this tool ONLY when the user asks for event recommendations, 'what to do', \
         or 'things to do' for today. This tool will find events from a database and \
         check the weather. The input must be a location (e.g., 'Singapore')."
    }

    async fn invoke(&self, argument: &str, context: &ToolContext<'_>) -> String {
        match self.get_recommendations(argument.trim(), context.today).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Event recommendation failed");
                format!("Error: {}", e)
            }
        }
    }
}
