//! Markdown-aware recursive splitter

use crate::domain::ingestion::{SplitterConfig, SplitterType, TextSplitter};
use crate::domain::DomainError;

use super::merge::Separator;
use super::recursive::RecursiveCharacterSplitter;

/// Regex separators, coarsest first: headings, code fences, thematic breaks, then the generic ones
pub const MARKDOWN_SEPARATORS: [&str; 9] = [
    "\n#{1,6} ",
    "```\n",
    "\n\\*\\*\\*+\n",
    "\n---+\n",
    "\n___+\n",
    "\n\n",
    "\n",
    " ",
    "",
];

/// Recursive splitter that prefers markdown structure boundaries
#[derive(Debug, Clone)]
pub struct MarkdownSplitter {
    inner: RecursiveCharacterSplitter,
}

impl MarkdownSplitter {
    pub fn new(config: &SplitterConfig) -> Result<Self, DomainError> {
        let mut separators = Vec::with_capacity(MARKDOWN_SEPARATORS.len() + 1);

        if let Some(ref custom) = config.separator {
            separators.push(Separator::literal(custom)?);
        }

        for pattern in MARKDOWN_SEPARATORS {
            separators.push(Separator::regex(pattern)?);
        }

        Ok(Self {
            inner: RecursiveCharacterSplitter::with_separators(config, separators)?,
        })
    }
}

impl TextSplitter for MarkdownSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, DomainError> {
        self.inner.split_text(text)
    }

    fn name(&self) -> &'static str {
        SplitterType::Markdown.as_str()
    }
}
