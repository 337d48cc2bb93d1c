//! BM25 lexical ranking over document passages.

use std::collections::{HashMap, HashSet};

/// BM25 search index for lexical matching
#[derive(Debug, Clone, Default)]
pub struct Bm25Index {
    /// Document ID -> tokenized content
    documents: HashMap<String, Vec<String>>,
    /// Term -> document IDs containing term
    inverted_index: HashMap<String, HashSet<String>>,
    /// Document frequencies for each term
    document_frequencies: HashMap<String, usize>,
    doc_count: usize,
    avg_doc_length: f32,
    /// Term frequency saturation
    k1: f32,
    /// Length normalization
    b: f32,
}

impl Bm25Index {
    pub fn new() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            ..Default::default()
        }
    }

    /// Tokenize text into lowercase terms
    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.len() > 1)
            .map(String::from)
            .collect()
    }

    /// Add a document to the index. Re-adding an id replaces the old content.
    pub fn add_document(&mut self, id: &str, content: &str) {
        self.remove_document(id);
        let tokens = Self::tokenize(content);

        let unique_terms: HashSet<_> = tokens.iter().cloned().collect();
        for term in &unique_terms {
            *self.document_frequencies.entry(term.clone()).or_insert(0) += 1;
            self.inverted_index
                .entry(term.clone())
                .or_default()
                .insert(id.to_string());
        }

        self.documents.insert(id.to_string(), tokens);
        self.doc_count += 1;
        self.update_avg_length();
    }

    fn remove_document(&mut self, id: &str) {
        let Some(tokens) = self.documents.remove(id) else {
            return;
        };
        let unique_terms: HashSet<_> = tokens.into_iter().collect();
        for term in unique_terms {
            if let Some(df) = self.document_frequencies.get_mut(&term) {
                *df = df.saturating_sub(1);
                if *df == 0 {
                    self.document_frequencies.remove(&term);
                }
            }
            if let Some(docs) = self.inverted_index.get_mut(&term) {
                docs.remove(id);
                if docs.is_empty() {
                    self.inverted_index.remove(&term);
                }
            }
        }
        self.doc_count = self.doc_count.saturating_sub(1);
        self.update_avg_length();
    }

    fn update_avg_length(&mut self) {
        self.avg_doc_length = if self.doc_count > 0 {
            let total_tokens: usize = self.documents.values().map(|v| v.len()).sum();
            total_tokens as f32 / self.doc_count as f32
        } else {
            0.0
        };
    }

    fn idf(&self, term: &str) -> f32 {
        let df = self.document_frequencies.get(term).copied().unwrap_or(0) as f32;
        let n = self.doc_count as f32;
        if df == 0.0 || n == 0.0 {
            return 0.0;
        }
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score_document(&self, doc_id: &str, query_terms: &[String]) -> f32 {
        let Some(doc_tokens) = self.documents.get(doc_id) else {
            return 0.0;
        };

        let doc_len = doc_tokens.len() as f32;
        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        for token in doc_tokens {
            *term_freq.entry(token.as_str()).or_insert(0) += 1;
        }

        query_terms
            .iter()
            .map(|term| {
                let tf = term_freq.get(term.as_str()).copied().unwrap_or(0) as f32;
                let numerator = tf * (self.k1 + 1.0);
                let denominator =
                    tf + self.k1 * (1.0 - self.b + self.b * doc_len / self.avg_doc_length);
                self.idf(term) * numerator / denominator
            })
            .sum()
    }

    /// Top-k document ids with their scores, best first. Ties keep id order.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<(String, f32)> {
        let query_terms = Self::tokenize(query);
        if query_terms.is_empty() {
            return Vec::new();
        }

        let mut candidates: HashSet<&String> = HashSet::new();
        for term in &query_terms {
            if let Some(docs) = self.inverted_index.get(term) {
                candidates.extend(docs.iter());
            }
        }

        let mut results: Vec<(String, f32)> = candidates
            .into_iter()
            .map(|id| (id.clone(), self.score_document(id, &query_terms)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        results.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        results.truncate(top_k);
        results
    }

    pub fn len(&self) -> usize {
        self.doc_count
    }

    pub fn is_empty(&self) -> bool {
        self.doc_count == 0
    }
}
