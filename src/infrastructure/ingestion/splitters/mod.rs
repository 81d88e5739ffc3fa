//! Text splitter implementations

mod character;
mod code;
mod html;
mod markdown;
mod merge;
mod recursive;
mod token;

pub use character::CharacterSplitter;
pub use code::{CodeSplitter, CODE_SEPARATORS};
pub use html::{HtmlHeaderSplitter, HEADER_KEYS};
pub use markdown::{MarkdownSplitter, MARKDOWN_SEPARATORS};
pub use merge::{ChunkMerger, Separator};
pub use recursive::{RecursiveCharacterSplitter, DEFAULT_SEPARATORS};
pub use token::TokenSplitter;
