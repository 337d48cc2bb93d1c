//! Local document retrieval.
//!
//! - [`chunker`] - word windows with overlap
//! - [`search`] - BM25 ranking
//! - [`index`] - the [`DocumentIndex`] seam and the file-backed [`KnowledgeBase`]

pub mod chunker;
pub mod index;
pub mod search;

pub use index::{DocumentIndex, KnowledgeBase, Passage};
