//! Tool infrastructure.
//!
//! A [`Tool`] is a named capability with a routing hint and an `invoke`
//! that always yields observation text. The [`ToolRegistry`] keeps tools in
//! registration order, which doubles as the priority order shown to the
//! routing policy.
//!
//! The concrete tools live in [`crate::agents`]; their names are the
//! constants below.

pub mod registry;

pub use registry::{Tool, ToolContext, ToolRegistry};

pub const DOCUMENT_KNOWLEDGE_BASE: &str = "DocumentKnowledgeBase";
pub const DATABASE_QUERY: &str = "DatabaseQuery";
pub const EVENT_RECOMMENDER: &str = "EventRecommender";
pub const CURRENT_WEATHER: &str = "CurrentWeather";
pub const IMAGE_GENERATOR: &str = "ImageGenerator";
pub const WEB_SEARCH: &str = "WebSearch";

/// Tool names in priority order.
pub const PRIORITY_ORDER: [&str; 6] = [
    DOCUMENT_KNOWLEDGE_BASE,
    DATABASE_QUERY,
    EVENT_RECOMMENDER,
    CURRENT_WEATHER,
    IMAGE_GENERATOR,
    WEB_SEARCH,
];
