//! Document loader implementations

mod doc;
mod docx;
mod pdf;
mod text;

pub use doc::{DocLoader, DEFAULT_CONVERTER};
pub use docx::DocxLoader;
pub use pdf::PdfLoader;
pub use text::TextLoader;

#[cfg(test)]
pub(crate) use docx::fixtures::write_docx;
#[cfg(test)]
pub(crate) use pdf::fixtures::write_pdf;
