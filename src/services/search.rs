//! Web search via daedra
//!
//! daedra uses DuckDuckGo as the search backend, so no API key is needed.

use crate::types::{AppError, Result};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub description: String,
}

#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

pub struct DuckDuckGoSearch {
    num_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(num_results: usize) -> Self {
        Self { num_results }
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl SearchService for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: self.num_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Service(format!("Search failed: {}", e)))?;

        Ok(response
            .data
            .iter()
            .map(|r| SearchHit {
                title: r.title.to_string(),
                url: r.url.to_string(),
                description: r.description.to_string(),
            })
            .collect())
    }
}
