//! LLM Provider Clients
//!
//! This module provides a unified interface for the generative-model
//! collaborator. The rest of the crate only sees [`LLMClient`]; concrete
//! providers are selected at runtime through [`Provider`].
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `openai` - OpenAI API (GPT-4 and compatible endpoints), on by default
//! - `ollama` - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use switchboard::llm::Provider;
//!
//! let client = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3.2".to_string(),
//! }
//! .create_client()
//! .await?;
//!
//! let answer = client.generate_with_system("Be brief.", "What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider enum.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, Provider};
