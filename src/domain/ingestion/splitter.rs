//! Text splitter trait, splitter types and configuration

use std::fmt::{self, Debug};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use super::loader::DocumentSegment;
use super::validation::validate_chunk_params;
use crate::domain::DomainError;

/// Chunk size used when a configuration leaves it unset
pub const DEFAULT_CHUNK_SIZE: usize = 4000;
/// Chunk overlap used when a configuration leaves it unset
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Closed set of segmentation algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitterType {
    /// Split on a single separator, then merge to size
    Character,
    /// Split on a hierarchy of separators, coarsest first
    RecursiveCharacter,
    /// Fixed windows of tokens
    Token,
    /// Recursive splitting on markdown structure
    Markdown,
    /// Sections delimited by HTML headers
    Html,
    /// Recursive splitting on code definitions
    Code,
}

impl SplitterType {
    pub const ALL: [SplitterType; 6] = [
        Self::Character,
        Self::RecursiveCharacter,
        Self::Token,
        Self::Markdown,
        Self::Html,
        Self::Code,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::RecursiveCharacter => "recursive_character",
            Self::Token => "token",
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Code => "code",
        }
    }
}

impl fmt::Display for SplitterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitterType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DomainError::invalid_splitter_configuration(format!(
                    "unknown splitter type '{}'",
                    s
                ))
            })
    }
}

/// Split text into word-boundary tokens. Concatenating the tokens yields the input.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_word_bounds().collect()
}

/// Number of non-whitespace word-boundary tokens in `text`
pub fn count_tokens(text: &str) -> usize {
    text.split_word_bounds()
        .filter(|t| !t.trim().is_empty())
        .count()
}

/// Measure used for `chunk_size` and `chunk_overlap`
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthFunction {
    /// Unicode scalar values
    #[default]
    Characters,
    /// UTF-8 bytes
    Bytes,
    /// Non-whitespace word-boundary tokens
    Tokens,
    /// Caller-supplied measure
    #[serde(skip)]
    Custom(Arc<dyn Fn(&str) -> usize + Send + Sync>),
}

impl LengthFunction {
    /// Wrap a closure as a length function
    pub fn custom(f: impl Fn(&str) -> usize + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn measure(&self, text: &str) -> usize {
        match self {
            Self::Characters => text.chars().count(),
            Self::Bytes => text.len(),
            Self::Tokens => count_tokens(text),
            Self::Custom(f) => f(text),
        }
    }
}

impl Debug for LengthFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Characters => f.write_str("Characters"),
            Self::Bytes => f.write_str("Bytes"),
            Self::Tokens => f.write_str("Tokens"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Splitter configuration; unset fields fall back to per-splitter defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Target maximum length of a chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    /// Length repeated between consecutive chunks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_overlap: Option<usize>,
    /// Preferred split boundary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    /// Whether separator text is retained in output chunks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_separator: Option<bool>,
    /// Length measure for chunk_size and chunk_overlap
    #[serde(default)]
    pub length_function: LengthFunction,
}

impl SplitterConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: Some(chunk_size),
            chunk_overlap: Some(chunk_overlap),
            ..Default::default()
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn with_keep_separator(mut self, keep: bool) -> Self {
        self.keep_separator = Some(keep);
        self
    }

    pub fn with_length_function(mut self, length_function: LengthFunction) -> Self {
        self.length_function = length_function;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP)
    }

    /// Validate size parameters
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_chunk_params(self.chunk_size(), self.chunk_overlap())
    }
}

/// Strategy that breaks text into smaller, possibly overlapping, chunks
pub trait TextSplitter: Send + Sync + Debug {
    /// Split a string into ordered chunks
    fn split_text(&self, text: &str) -> Result<Vec<String>, DomainError>;

    /// Splitter name, matching its [`SplitterType`]
    fn name(&self) -> &'static str;

    /// Split one segment; every chunk inherits the segment's metadata
    fn split_segment(&self, segment: &DocumentSegment) -> Result<Vec<DocumentSegment>, DomainError> {
        Ok(self
            .split_text(&segment.content)?
            .into_iter()
            .map(|content| DocumentSegment {
                content,
                metadata: segment.metadata.clone(),
            })
            .collect())
    }

    /// Split each segment independently, preserving order
    fn split_segments(
        &self,
        segments: &[DocumentSegment],
    ) -> Result<Vec<DocumentSegment>, DomainError> {
        let mut result = Vec::new();

        for segment in segments {
            result.extend(self.split_segment(segment)?);
        }

        Ok(result)
    }
}
