//! Clients for the hosted services behind the tools.
//!
//! Each client sits behind a small trait so the sub-agents can be exercised
//! against stubs:
//! - [`weather`] - WeatherAPI.com current conditions
//! - [`images`] - OpenAI-compatible image generation
//! - [`search`] - DuckDuckGo web search through daedra

pub mod images;
pub mod search;
pub mod weather;

pub use images::{ImageService, OpenAIImageClient};
pub use search::{DuckDuckGoSearch, SearchHit, SearchService};
pub use weather::{CurrentWeather, WeatherApiClient, WeatherService};
