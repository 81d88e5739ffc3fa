//! Separator matching and the merge step shared by the separator-based splitters

use std::collections::VecDeque;

use regex::Regex;
use tracing::warn;

use crate::domain::ingestion::{LengthFunction, SplitterConfig};
use crate::domain::DomainError;

/// A split boundary, matched literally or as a regular expression.
///
/// The empty separator splits text into individual characters.
#[derive(Debug, Clone)]
pub struct Separator {
    raw: String,
    is_regex: bool,
    pattern: Option<Regex>,
}

impl Separator {
    pub fn literal(separator: &str) -> Result<Self, DomainError> {
        Self::compile(separator, false)
    }

    pub fn regex(pattern: &str) -> Result<Self, DomainError> {
        Self::compile(pattern, true)
    }

    fn compile(raw: &str, is_regex: bool) -> Result<Self, DomainError> {
        let pattern = if raw.is_empty() {
            None
        } else {
            let source = if is_regex {
                raw.to_string()
            } else {
                regex::escape(raw)
            };

            Some(Regex::new(&source).map_err(|e| {
                DomainError::invalid_splitter_configuration(format!(
                    "invalid separator '{}': {}",
                    raw.escape_debug(),
                    e
                ))
            })?)
        };

        Ok(Self {
            raw: raw.to_string(),
            is_regex,
            pattern,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    /// Whether the separator occurs in `text`
    pub fn is_found_in(&self, text: &str) -> bool {
        match self.pattern {
            Some(ref re) => re.is_match(text),
            None => true,
        }
    }

    /// Text placed between pieces when the separator itself was dropped.
    /// Regex separators have no single literal form, so they join with nothing.
    pub fn joiner(&self) -> &str {
        if self.is_regex { "" } else { &self.raw }
    }

    /// Split `text` on this separator, dropping empty pieces.
    ///
    /// With `keep_separator` every match stays attached to the start of the piece
    /// that follows it, so concatenating the pieces yields `text`.
    pub fn split<'a>(&self, text: &'a str, keep_separator: bool) -> Vec<&'a str> {
        let Some(ref re) = self.pattern else {
            return text
                .char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect();
        };

        if !keep_separator {
            return re.split(text).filter(|s| !s.is_empty()).collect();
        }

        let mut pieces = Vec::new();
        let mut start = 0;

        for m in re.find_iter(text) {
            if m.start() == m.end() {
                continue;
            }

            pieces.push(&text[start..m.start()]);
            start = m.start();
        }

        pieces.push(&text[start..]);
        pieces.retain(|s| !s.is_empty());
        pieces
    }
}

/// Sizing rules applied when merging small pieces into chunks
#[derive(Debug, Clone)]
pub struct ChunkMerger {
    chunk_size: usize,
    chunk_overlap: usize,
    length_function: LengthFunction,
}

impl ChunkMerger {
    pub fn from_config(config: &SplitterConfig) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            chunk_size: config.chunk_size(),
            chunk_overlap: config.chunk_overlap(),
            length_function: config.length_function.clone(),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn length(&self, text: &str) -> usize {
        self.length_function.measure(text)
    }

    /// Greedily pack `splits` into chunks of at most `chunk_size`, joined by `separator`.
    ///
    /// Each emitted chunk is whitespace-trimmed and dropped when empty. After a chunk is
    /// emitted the window is shrunk from the front until it is no longer than
    /// `chunk_overlap` and the next piece fits, which yields the overlap between
    /// consecutive chunks. A single piece longer than `chunk_size` becomes its own chunk.
    pub fn merge_splits<S: AsRef<str>>(&self, splits: &[S], separator: &str) -> Vec<String> {
        let separator_len = self.length(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            let split = split.as_ref();
            let len = self.length(split);

            if total + len + joiner_len(&window, separator_len) > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        chunk_length = total,
                        chunk_size = self.chunk_size,
                        "Created a chunk longer than the configured chunk size"
                    );
                }

                if !window.is_empty() {
                    if let Some(chunk) = join_window(&window, separator) {
                        chunks.push(chunk);
                    }

                    while total > self.chunk_overlap
                        || (total + len + joiner_len(&window, separator_len) > self.chunk_size
                            && total > 0)
                    {
                        let Some((_, first_len)) = window.pop_front() else {
                            break;
                        };
                        let joined = if window.is_empty() { 0 } else { separator_len };
                        total = total.saturating_sub(first_len + joined);
                    }
                }
            }

            window.push_back((split, len));
            total += len + if window.len() > 1 { separator_len } else { 0 };
        }

        if let Some(chunk) = join_window(&window, separator) {
            chunks.push(chunk);
        }

        chunks
    }
}

fn joiner_len(window: &VecDeque<(&str, usize)>, separator_len: usize) -> usize {
    if window.is_empty() { 0 } else { separator_len }
}

fn join_window(window: &VecDeque<(&str, usize)>, separator: &str) -> Option<String> {
    let joined = window
        .iter()
        .map(|(piece, _)| *piece)
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merger(size: usize, overlap: usize) -> ChunkMerger {
        ChunkMerger::from_config(&SplitterConfig::new(size, overlap)).unwrap()
    }

    #[test]
    fn test_literal_split_drops_separator() {
        let sep = Separator::literal("\n\n").unwrap();
        assert_eq!(sep.split("a\n\nb\n\n\n\nc", false), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_literal_split_keeps_separator_at_start() {
        let sep = Separator::literal(" ").unwrap();
        let text = "one two  three";
        let pieces = sep.split(text, true);

        assert_eq!(pieces, vec!["one", " two", " ", " three"]);
        assert_eq!(pieces.concat(), text);
    }

    #[test]
    fn test_literal_separator_is_escaped() {
        let sep = Separator::literal(".").unwrap();
        assert!(!sep.is_found_in("no dots here"));
        assert_eq!(sep.split("a.b", false), vec!["a", "b"]);
    }

    #[test]
    fn test_regex_separator() {
        let sep = Separator::regex("\n#{1,6} ").unwrap();
        let pieces = sep.split("intro\n# One\nbody\n## Two\nmore", true);

        assert_eq!(pieces, vec!["intro", "\n# One\nbody", "\n## Two\nmore"]);
        assert_eq!(sep.joiner(), "");
    }

    #[test]
    fn test_invalid_regex_fails_at_construction() {
        let err = Separator::regex("(unclosed").unwrap_err();
        assert!(matches!(err, DomainError::InvalidSplitterConfiguration { .. }));
    }

    #[test]
    fn test_empty_separator_splits_characters() {
        let sep = Separator::literal("").unwrap();
        assert!(sep.is_empty());
        assert!(sep.is_found_in("anything"));
        assert_eq!(sep.split("héj", true), vec!["h", "é", "j"]);
    }

    #[test]
    fn test_merge_packs_up_to_chunk_size() {
        let chunks = merger(10, 0).merge_splits(&["aaaa", "bbbb", "cccc"], " ");
        assert_eq!(chunks, vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn test_merge_overlap_carries_trailing_pieces() {
        let pieces = ["aaa", "bbb", "ccc", "ddd"];
        let chunks = merger(7, 3).merge_splits(&pieces, " ");

        assert_eq!(chunks, vec!["aaa bbb", "bbb ccc", "ccc ddd"]);
    }

    #[test]
    fn test_merge_oversize_piece_stands_alone() {
        let chunks = merger(5, 0).merge_splits(&["ab", "abcdefgh", "cd"], " ");
        assert_eq!(chunks, vec!["ab", "abcdefgh", "cd"]);
    }

    #[test]
    fn test_merge_drops_blank_chunks() {
        let chunks = merger(3, 0).merge_splits(&["  ", "   ", "x"], "");
        assert_eq!(chunks, vec!["x"]);
    }

    #[test]
    fn test_merge_characters_window() {
        let text: String = "abcdefghij".repeat(5);
        let pieces: Vec<&str> = Separator::literal("").unwrap().split(&text, true);
        let chunks = merger(20, 5).merge_splits(&pieces, "");

        assert_eq!(chunks[0], &text[0..20]);
        assert_eq!(chunks[1], &text[15..35]);
        assert_eq!(chunks[2], &text[30..50]);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_merger_rejects_bad_config() {
        assert!(ChunkMerger::from_config(&SplitterConfig::new(10, 10)).is_err());
    }
}
