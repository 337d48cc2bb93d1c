use super::chunker::TextChunker;
use super::search::Bm25Index;
use crate::types::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File extensions the knowledge base can read as plain text.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

/// A ranked chunk of an indexed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    pub source: String,
    pub text: String,
    pub score: f32,
}

/// Queryable document index: `search(query) -> ranked passages`.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Passage>>;

    fn is_empty(&self) -> bool;
}

/// In-memory BM25 index over chunked text files.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    chunker: TextChunker,
    index: Bm25Index,
    /// chunk id -> (source, text)
    chunks: HashMap<String, (String, String)>,
}

impl KnowledgeBase {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunker: TextChunker::new(chunk_size, chunk_overlap),
            index: Bm25Index::new(),
            chunks: HashMap::new(),
        }
    }

    /// Build an index from the given files. Unsupported or unreadable files
    /// are skipped with a warning.
    pub fn from_files(paths: &[PathBuf], chunk_size: usize, chunk_overlap: usize) -> Self {
        let mut kb = Self::new(chunk_size, chunk_overlap);
        for path in paths {
            if !is_supported(path) {
                tracing::warn!(path = %path.display(), "Skipping unsupported document type");
                continue;
            }
            match std::fs::read_to_string(path) {
                Ok(text) => {
                    let added = kb.add_text(&path.display().to_string(), &text);
                    tracing::info!(path = %path.display(), chunks = added, "Indexed document");
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable document");
                }
            }
        }
        kb
    }

    /// Chunk and index `text`; returns the number of chunks added.
    pub fn add_text(&mut self, source: &str, text: &str) -> usize {
        let chunks = self.chunker.chunk(text);
        for (i, chunk) in chunks.iter().enumerate() {
            let id = format!("{}#{}", source, i);
            self.index.add_document(&id, chunk);
            self.chunks.insert(id, (source.to_string(), chunk.clone()));
        }
        chunks.len()
    }

    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

#[async_trait]
impl DocumentIndex for KnowledgeBase {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Passage>> {
        Ok(self
            .index
            .search(query, limit)
            .into_iter()
            .filter_map(|(id, score)| {
                self.chunks.get(&id).map(|(source, text)| Passage {
                    source: source.clone(),
                    text: text.clone(),
                    score,
                })
            })
            .collect())
    }

    fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
