//! WeatherAPI.com client for current conditions.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// WeatherAPI error code for "No matching location found."
const NO_MATCHING_LOCATION: i64 = 1006;

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    pub location: WeatherLocation,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherLocation {
    pub name: String,
    pub region: String,
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub text: String,
}

impl CurrentWeather {
    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Current weather in {}, {}, {}: {:.1}°C / {:.1}°F, {}.",
            self.location.name,
            self.location.region,
            self.location.country,
            self.current.temp_c,
            self.current.temp_f,
            self.current.condition.text
        )
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

/// Current-conditions lookup.
#[async_trait]
pub trait WeatherService: Send + Sync {
    /// # Errors
    ///
    /// [`AppError::NotFound`] for an unknown location, [`AppError::Service`]
    /// for any other HTTP or transport failure.
    async fn current(&self, location: &str) -> Result<CurrentWeather>;
}

pub struct WeatherApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl WeatherService for WeatherApiClient {
    async fn current(&self, location: &str) -> Result<CurrentWeather> {
        let response = self
            .http
            .get(format!("{}/current.json", self.base_url))
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", location),
                ("aqi", "no"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Service(format!("Weather API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, location, "Weather API returned an error");
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(body) if body.error.code == Some(NO_MATCHING_LOCATION) => {
                    AppError::NotFound(body.error.message)
                }
                Ok(body) => AppError::Service(body.error.message),
                Err(_) => AppError::Service(format!("HTTP {}", status.as_u16())),
            });
        }

        response
            .json::<CurrentWeather>()
            .await
            .map_err(|e| AppError::Service(format!("Invalid weather response: {}", e)))
    }
}
