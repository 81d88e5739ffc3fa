//! Source-code-aware recursive splitter

use crate::domain::ingestion::{SplitterConfig, SplitterType, TextSplitter};
use crate::domain::DomainError;

use super::merge::Separator;
use super::recursive::{RecursiveCharacterSplitter, DEFAULT_SEPARATORS};

/// Definition and control-flow boundaries common to mainstream languages
pub const CODE_SEPARATORS: [&str; 15] = [
    "\nclass ",
    "\nstruct ",
    "\nenum ",
    "\ntrait ",
    "\nimpl ",
    "\npub fn ",
    "\nfn ",
    "\ndef ",
    "\nfunction ",
    "\nconst ",
    "\nlet ",
    "\nif ",
    "\nfor ",
    "\nwhile ",
    "\nswitch ",
];

/// Recursive splitter that prefers top-level definitions, then falls back to
/// paragraphs, lines, words and characters
#[derive(Debug, Clone)]
pub struct CodeSplitter {
    inner: RecursiveCharacterSplitter,
}

impl CodeSplitter {
    pub fn new(config: &SplitterConfig) -> Result<Self, DomainError> {
        let custom = config.separator.as_deref();
        let mut separators = Vec::new();

        if let Some(custom) = custom {
            separators.push(Separator::literal(custom)?);
        }

        for separator in CODE_SEPARATORS.iter().chain(DEFAULT_SEPARATORS.iter()) {
            if custom != Some(*separator) {
                separators.push(Separator::literal(separator)?);
            }
        }

        Ok(Self {
            inner: RecursiveCharacterSplitter::with_separators(config, separators)?,
        })
    }
}

impl TextSplitter for CodeSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, DomainError> {
        self.inner.split_text(text)
    }

    fn name(&self) -> &'static str {
        SplitterType::Code.as_str()
    }
}
