//! Recursive character splitter

use crate::domain::ingestion::{SplitterConfig, SplitterType, TextSplitter};
use crate::domain::DomainError;

use super::merge::{ChunkMerger, Separator};

/// Separators tried in order: paragraphs, lines, words, characters
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splitter that breaks text on the coarsest separator present and recurses
/// into any piece still too long, using the next separators in the list.
///
/// Separators are kept at the start of the following piece unless
/// `keep_separator` is set to false.
///
/// Overlap is carried in whole pieces and chunk edges are trimmed. Text split
/// down to characters rebuilds byte for byte once the overlap is removed;
/// text split on spaces rebuilds word for word, without the whitespace at
/// chunk edges.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    merger: ChunkMerger,
    separators: Vec<Separator>,
    keep_separator: bool,
}

impl RecursiveCharacterSplitter {
    /// Create a splitter over [`DEFAULT_SEPARATORS`]; a configured separator is tried first
    pub fn new(config: &SplitterConfig) -> Result<Self, DomainError> {
        let mut separators = Vec::with_capacity(DEFAULT_SEPARATORS.len() + 1);

        if let Some(ref custom) = config.separator {
            separators.push(Separator::literal(custom)?);
        }

        for separator in DEFAULT_SEPARATORS {
            if config.separator.as_deref() != Some(separator) {
                separators.push(Separator::literal(separator)?);
            }
        }

        Self::with_separators(config, separators)
    }

    /// Create a splitter over an explicit, coarsest-first separator list
    pub fn with_separators(
        config: &SplitterConfig,
        separators: Vec<Separator>,
    ) -> Result<Self, DomainError> {
        if separators.is_empty() {
            return Err(DomainError::invalid_splitter_configuration(
                "recursive splitter needs at least one separator",
            ));
        }

        Ok(Self {
            merger: ChunkMerger::from_config(config)?,
            separators,
            keep_separator: config.keep_separator.unwrap_or(true),
        })
    }

    pub fn separators(&self) -> impl Iterator<Item = &str> {
        self.separators.iter().map(Separator::as_str)
    }

    fn split_recursive(&self, text: &str, separators: &[Separator]) -> Vec<String> {
        let mut separator = separators.last();
        let mut remaining: &[Separator] = &[];

        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = Some(candidate);
                break;
            }

            if candidate.is_found_in(text) {
                separator = Some(candidate);
                remaining = &separators[i + 1..];
                break;
            }
        }

        let Some(separator) = separator else {
            return Vec::new();
        };

        let joiner = if self.keep_separator {
            ""
        } else {
            separator.joiner()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in separator.split(text, self.keep_separator) {
            if self.merger.length(piece) < self.merger.chunk_size() {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merger.merge_splits(&fitting, joiner));
                fitting.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();

                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merger.merge_splits(&fitting, joiner));
        }

        chunks
    }
}

impl TextSplitter for RecursiveCharacterSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, DomainError> {
        Ok(self.split_recursive(text, &self.separators))
    }

    fn name(&self) -> &'static str {
        SplitterType::RecursiveCharacter.as_str()
    }
}
