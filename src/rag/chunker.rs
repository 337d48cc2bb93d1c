/// Splits text into word windows that overlap by a fixed number of words.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// `chunk_overlap` is clamped below `chunk_size` so the window always advances.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::new();
        let step = self.chunk_size - self.chunk_overlap;

        for i in (0..words.len()).step_by(step) {
            let end = (i + self.chunk_size).min(words.len());
            chunks.push(words[i..end].join(" "));
            if end == words.len() {
                break;
            }
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_overlap() {
        let chunker = TextChunker::new(4, 2);
        let chunks = chunker.chunk("a b c d e f g");
        assert_eq!(chunks, vec!["a b c d", "c d e f", "e f g"]);
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunker = TextChunker::new(100, 20);
        assert_eq!(chunker.chunk("only a few words"), vec!["only a few words"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(TextChunker::new(10, 2).chunk("   \n").is_empty());
    }

    #[test]
    fn test_overlap_not_smaller_than_size_still_advances() {
        let chunker = TextChunker::new(2, 5);
        assert_eq!(chunker.chunk("a b c"), vec!["a b", "b c"]);
    }
}
