use super::upstream_message;
use crate::services::WeatherService;
use crate::tools::{Tool, ToolContext, CURRENT_WEATHER};
use async_trait::async_trait;
use std::sync::Arc;

/// Current conditions for a single location.
pub struct WeatherLookupAgent {
    weather: Arc<dyn WeatherService>,
}

impl WeatherLookupAgent {
    pub fn new(weather: Arc<dyn WeatherService>) -> Self {
        Self { weather }
    }
}

#[async_trait]
impl Tool for WeatherLookupAgent {
    fn name(&self) -> &str {
        CURRENT_WEATHER
    }

    fn description(&self) -> &str {
        "Use this tool ONLY when the user asks just for the current weather, \
         weather forecast, or temperature for a specific location. \
         Do NOT use this if they are also asking for event recommendations. \
         The input must be a location."
    }

    async fn invoke(&self, argument: &str, _context: &ToolContext<'_>) -> String {
        let location = argument.trim();
        match self.weather.current(location).await {
            Ok(weather) => {
                let summary = weather.summary();
                tracing::info!(location, %summary, "Weather lookup succeeded");
                summary
            }
            Err(e) => {
                tracing::warn!(location, error = %e, "Weather lookup failed");
                format!("Error getting weather: {}", upstream_message(e))
            }
        }
    }
}
