//! Token window splitter

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::ingestion::{SplitterConfig, SplitterType, TextSplitter};
use crate::domain::DomainError;

/// Splitter that cuts text into windows of `chunk_size` tokens, each starting
/// `chunk_size - chunk_overlap` tokens after the previous one.
///
/// Tokens are the non-whitespace Unicode word-boundary segments of the text;
/// whitespace between tokens inside a window is preserved verbatim. Sizes are
/// always counted in tokens, whatever length function is configured.
#[derive(Debug, Clone)]
pub struct TokenSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TokenSplitter {
    pub fn new(config: &SplitterConfig) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            chunk_size: config.chunk_size(),
            chunk_overlap: config.chunk_overlap(),
        })
    }
}

impl TextSplitter for TokenSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, DomainError> {
        let tokens: Vec<(usize, &str)> = text
            .split_word_bound_indices()
            .filter(|(_, token)| !token.trim().is_empty())
            .collect();

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < tokens.len() {
            let end = (start + self.chunk_size).min(tokens.len());
            let from = tokens[start].0;
            let (last_offset, last_token) = tokens[end - 1];

            chunks.push(text[from..last_offset + last_token.len()].to_string());

            if end == tokens.len() {
                break;
            }

            start += step;
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        SplitterType::Token.as_str()
    }
}
