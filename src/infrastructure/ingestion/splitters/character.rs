//! Single-separator character splitter

use crate::domain::ingestion::{SplitterConfig, SplitterType, TextSplitter};
use crate::domain::DomainError;

use super::merge::{ChunkMerger, Separator};

/// Separator used when none is configured
pub const DEFAULT_SEPARATOR: &str = "\n\n";

/// Splitter that breaks text on one literal separator and merges the pieces to size
#[derive(Debug, Clone)]
pub struct CharacterSplitter {
    merger: ChunkMerger,
    separator: Separator,
    keep_separator: bool,
}

impl CharacterSplitter {
    pub fn new(config: &SplitterConfig) -> Result<Self, DomainError> {
        let separator = config.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR);

        Ok(Self {
            merger: ChunkMerger::from_config(config)?,
            separator: Separator::literal(separator)?,
            keep_separator: config.keep_separator.unwrap_or(false),
        })
    }
}

impl TextSplitter for CharacterSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, DomainError> {
        let pieces = self.separator.split(text, self.keep_separator);
        let joiner = if self.keep_separator {
            ""
        } else {
            self.separator.joiner()
        };

        Ok(self.merger.merge_splits(&pieces, joiner))
    }

    fn name(&self) -> &'static str {
        SplitterType::Character.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_paragraphs_by_default() {
        let splitter = CharacterSplitter::new(&SplitterConfig::new(20, 0)).unwrap();
        let chunks = splitter
            .split_text("first paragraph\n\nsecond paragraph\n\nthird")
            .unwrap();

        assert_eq!(chunks, vec!["first paragraph", "second paragraph", "third"]);
    }

    #[test]
    fn test_small_paragraphs_are_merged() {
        let splitter = CharacterSplitter::new(&SplitterConfig::new(100, 0)).unwrap();
        let chunks = splitter.split_text("one\n\ntwo\n\nthree").unwrap();

        assert_eq!(chunks, vec!["one\n\ntwo\n\nthree"]);
    }

    #[test]
    fn test_custom_separator_with_overlap() {
        let config = SplitterConfig::new(9, 4).with_separator(",");
        let splitter = CharacterSplitter::new(&config).unwrap();

        let chunks = splitter.split_text("aaaa,bbbb,cccc").unwrap();
        assert_eq!(chunks, vec!["aaaa,bbbb", "bbbb,cccc"]);
    }

    #[test]
    fn test_oversize_piece_is_not_cut() {
        let splitter = CharacterSplitter::new(&SplitterConfig::new(5, 0)).unwrap();
        let chunks = splitter.split_text("a long paragraph").unwrap();

        assert_eq!(chunks, vec!["a long paragraph"]);
    }

    #[test]
    fn test_keep_separator() {
        let config = SplitterConfig::new(8, 0)
            .with_separator(";")
            .with_keep_separator(true);
        let splitter = CharacterSplitter::new(&config).unwrap();

        let chunks = splitter.split_text("abc;def;ghi").unwrap();
        assert_eq!(chunks, vec!["abc;def", ";ghi"]);
    }
}
