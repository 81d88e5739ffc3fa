//! Document type detection from leading bytes

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// `%PDF`
pub const PDF_MAGIC: [u8; 4] = *b"%PDF";
/// OLE2 compound file binary header used by legacy Word documents
pub const CFB_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];
/// ZIP local file header prefix
pub const ZIP_MAGIC: [u8; 2] = *b"PK";
/// Number of bytes sampled when probing for UTF-8 text
pub const TEXT_PROBE_LEN: usize = 1024;

/// Closed set of supported document types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Doc,
    Docx,
    Txt,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [Self::Pdf, Self::Doc, Self::Docx, Self::Txt];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }

    /// Classify a byte prefix. `None` means unrecognized.
    ///
    /// Checks run in priority order: PDF, legacy DOC, ZIP (treated as DOCX without
    /// inspecting the archive), then UTF-8 text over the first [`TEXT_PROBE_LEN`] bytes.
    /// An empty prefix is unrecognized.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }

        if bytes.starts_with(&PDF_MAGIC) {
            return Some(Self::Pdf);
        }

        if bytes.starts_with(&CFB_MAGIC) {
            return Some(Self::Doc);
        }

        if bytes.starts_with(&ZIP_MAGIC) {
            return Some(Self::Docx);
        }

        let probe = &bytes[..bytes.len().min(TEXT_PROBE_LEN)];

        if is_utf8_prefix(probe, bytes.len() > TEXT_PROBE_LEN) {
            Some(Self::Txt)
        } else {
            None
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "doc" => Ok(Self::Doc),
            "docx" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            other => Err(DomainError::unsupported_document_type(format!(
                "unknown document type '{}'",
                other
            ))),
        }
    }
}

/// A sample cut at the probe boundary may end inside a multi-byte sequence;
/// that tail is tolerated when the input continues past the sample.
fn is_utf8_prefix(sample: &[u8], truncated: bool) -> bool {
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        Err(e) => truncated && e.error_len().is_none(),
    }
}

/// Detect the document type of a seekable stream.
///
/// Reads at most [`TEXT_PROBE_LEN`] + 1 bytes and restores the original stream
/// position before returning, on success and on read errors alike.
pub fn detect_document_type<R: Read + Seek>(reader: &mut R) -> io::Result<Option<DocumentType>> {
    let start = reader.stream_position()?;

    let mut sample = Vec::with_capacity(TEXT_PROBE_LEN + 1);
    let read = reader
        .by_ref()
        .take(TEXT_PROBE_LEN as u64 + 1)
        .read_to_end(&mut sample);

    reader.seek(SeekFrom::Start(start))?;
    read?;

    Ok(DocumentType::from_magic(&sample))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn detect(bytes: &[u8]) -> Option<DocumentType> {
        let mut cursor = Cursor::new(bytes.to_vec());
        detect_document_type(&mut cursor).unwrap()
    }

    #[test]
    fn test_detect_pdf() {
        assert_eq!(detect(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3"), Some(DocumentType::Pdf));
    }

    #[test]
    fn test_detect_doc() {
        assert_eq!(
            detect(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
            Some(DocumentType::Doc)
        );
    }

    #[test]
    fn test_detect_zip_as_docx() {
        assert_eq!(detect(b"PK\x03\x04\x14\x00\x06\x00"), Some(DocumentType::Docx));
        assert_eq!(detect(b"PK"), Some(DocumentType::Docx));
    }

    #[test]
    fn test_detect_text() {
        assert_eq!(detect(b"Plain notes about the quarterly plan."), Some(DocumentType::Txt));
        assert_eq!(detect("Grüße aus Köln".as_bytes()), Some(DocumentType::Txt));
    }

    #[test]
    fn test_detect_invalid_utf8_is_unrecognized() {
        assert_eq!(detect(&[0xFF, 0xFE, 0x00, 0x81, 0x82]), None);
    }

    #[test]
    fn test_detect_empty_is_unrecognized() {
        assert_eq!(detect(b""), None);
    }

    #[test]
    fn test_magic_takes_priority_over_text() {
        assert_eq!(detect(b"%PDF is also valid ascii"), Some(DocumentType::Pdf));
        assert_eq!(detect(b"PKanything"), Some(DocumentType::Docx));
    }

    #[test]
    fn test_probe_cut_inside_multibyte_char() {
        let mut text = "a".repeat(TEXT_PROBE_LEN - 1);
        text.push('é');
        text.push_str("tail");

        assert_eq!(detect(text.as_bytes()), Some(DocumentType::Txt));
    }

    #[test]
    fn test_invalid_byte_after_probe_window_is_ignored() {
        let mut bytes = vec![b'x'; TEXT_PROBE_LEN];
        bytes.extend_from_slice(&[0xFF, 0xFF]);

        assert_eq!(detect(&bytes), Some(DocumentType::Txt));
    }

    #[test]
    fn test_stream_position_is_restored() {
        let mut cursor = Cursor::new(b"%PDF-1.4 rest of file".to_vec());
        detect_document_type(&mut cursor).unwrap();
        assert_eq!(cursor.position(), 0);

        let mut cursor = Cursor::new("hello world".repeat(200).into_bytes());
        detect_document_type(&mut cursor).unwrap();
        assert_eq!(cursor.position(), 0);

        let mut full = Vec::new();
        cursor.read_to_end(&mut full).unwrap();
        assert_eq!(full.len(), 2200);
    }

    #[test]
    fn test_document_type_from_str() {
        assert_eq!("PDF".parse::<DocumentType>().unwrap(), DocumentType::Pdf);
        assert_eq!("docx".parse::<DocumentType>().unwrap(), DocumentType::Docx);
        assert!("xlsx".parse::<DocumentType>().is_err());
    }
}
