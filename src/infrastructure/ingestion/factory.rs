//! Registries for document loaders and text splitters

use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use crate::domain::ingestion::{
    detect_document_type, DocumentLoader, DocumentType, SplitterConfig, SplitterType, TextSplitter,
};
use crate::domain::DomainError;

use super::loaders::{DocLoader, DocxLoader, PdfLoader, TextLoader};
use super::splitters::{
    CharacterSplitter, CodeSplitter, HtmlHeaderSplitter, MarkdownSplitter,
    RecursiveCharacterSplitter, TokenSplitter,
};

/// Mapping from document type to the loader that reads it
#[derive(Debug, Clone)]
pub struct LoaderRegistry {
    loaders: HashMap<DocumentType, Arc<dyn DocumentLoader>>,
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LoaderRegistry {
    /// Registry with the built-in PDF, DOC, DOCX and TXT loaders
    pub fn new() -> Self {
        Self::empty()
            .with_loader(Arc::new(PdfLoader::new()))
            .with_loader(Arc::new(DocLoader::new()))
            .with_loader(Arc::new(DocxLoader::new()))
            .with_loader(Arc::new(TextLoader::new()))
    }

    /// Registry with no loaders
    pub fn empty() -> Self {
        Self {
            loaders: HashMap::new(),
        }
    }

    /// Register a loader for its document type, replacing any previous one
    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loaders.insert(loader.document_type(), loader);
        self
    }

    /// Loader for `document_type`
    pub fn get_loader(
        &self,
        document_type: DocumentType,
    ) -> Result<Arc<dyn DocumentLoader>, DomainError> {
        self.loaders.get(&document_type).cloned().ok_or_else(|| {
            DomainError::unsupported_document_type(format!(
                "no loader registered for '{}'",
                document_type
            ))
        })
    }

    /// Document types with a registered loader
    pub fn supported_types(&self) -> Vec<DocumentType> {
        DocumentType::ALL
            .into_iter()
            .filter(|t| self.loaders.contains_key(t))
            .collect()
    }

    /// Sniff the file's leading bytes and return its type with the matching loader
    pub async fn loader_for_path(
        &self,
        path: &Path,
    ) -> Result<(DocumentType, Arc<dyn DocumentLoader>), DomainError> {
        let document_type = detect_file_type(path).await?.ok_or_else(|| {
            DomainError::unsupported_document_type(format!(
                "no loader found for file '{}'",
                path.display()
            ))
        })?;

        Ok((document_type, self.get_loader(document_type)?))
    }
}

/// Detect the document type of a file on disk. `None` means unrecognized.
pub async fn detect_file_type(path: &Path) -> Result<Option<DocumentType>, DomainError> {
    let owned = path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&owned).map_err(|e| {
            DomainError::document_load(format!("Failed to open '{}': {}", owned.display(), e))
        })?;

        detect_document_type(&mut BufReader::new(file)).map_err(|e| {
            DomainError::document_load(format!("Failed to read '{}': {}", owned.display(), e))
        })
    })
    .await
    .map_err(|e| DomainError::internal(format!("Type detection task failed: {}", e)))?
}

/// Factory for creating text splitters
#[derive(Debug, Default)]
pub struct SplitterFactory;

impl SplitterFactory {
    /// Create a splitter of the given type; configuration errors surface here, not at split time
    pub fn create(
        splitter_type: SplitterType,
        config: &SplitterConfig,
    ) -> Result<Arc<dyn TextSplitter>, DomainError> {
        let splitter: Arc<dyn TextSplitter> = match splitter_type {
            SplitterType::Character => Arc::new(CharacterSplitter::new(config)?),
            SplitterType::RecursiveCharacter => Arc::new(RecursiveCharacterSplitter::new(config)?),
            SplitterType::Token => Arc::new(TokenSplitter::new(config)?),
            SplitterType::Markdown => Arc::new(MarkdownSplitter::new(config)?),
            SplitterType::Html => Arc::new(HtmlHeaderSplitter::new(config)?),
            SplitterType::Code => Arc::new(CodeSplitter::new(config)?),
        };

        Ok(splitter)
    }

    /// Create a splitter from its snake_case name
    pub fn create_by_name(
        name: &str,
        config: &SplitterConfig,
    ) -> Result<Arc<dyn TextSplitter>, DomainError> {
        Self::create(name.parse()?, config)
    }

    /// Get a list of all available splitter types
    pub fn available_types() -> Vec<SplitterType> {
        SplitterType::ALL.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingestion::MockDocumentLoader;
    use std::io::Write;

    #[test]
    fn test_registry_covers_all_types() {
        let registry = LoaderRegistry::new();

        for document_type in DocumentType::ALL {
            let loader = registry.get_loader(document_type).unwrap();
            assert_eq!(loader.document_type(), document_type);
        }

        assert_eq!(registry.supported_types(), DocumentType::ALL.to_vec());
    }

    #[test]
    fn test_empty_registry_reports_unsupported() {
        let result = LoaderRegistry::empty().get_loader(DocumentType::Pdf);
        assert!(matches!(
            result,
            Err(DomainError::UnsupportedDocumentType { .. })
        ));
    }

    #[test]
    fn test_with_loader_replaces_existing() {
        let registry = LoaderRegistry::new()
            .with_loader(Arc::new(MockDocumentLoader::new(DocumentType::Txt)));

        let loader = registry.get_loader(DocumentType::Txt).unwrap();
        assert!(format!("{:?}", loader).contains("MockDocumentLoader"));
    }

    #[tokio::test]
    async fn test_loader_for_text_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "plain words").unwrap();

        let (document_type, loader) = LoaderRegistry::new()
            .loader_for_path(file.path())
            .await
            .unwrap();

        assert_eq!(document_type, DocumentType::Txt);
        assert_eq!(loader.document_type(), DocumentType::Txt);
    }

    #[tokio::test]
    async fn test_loader_for_binary_path_is_unsupported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x00, 0xFF, 0xFE, 0x80, 0x81]).unwrap();

        let result = LoaderRegistry::new().loader_for_path(file.path()).await;

        assert!(matches!(
            result,
            Err(DomainError::UnsupportedDocumentType { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_file_is_unsupported() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let result = LoaderRegistry::new().loader_for_path(file.path()).await;

        assert!(matches!(
            result,
            Err(DomainError::UnsupportedDocumentType { .. })
        ));
    }

    #[test]
    fn test_splitter_factory_creates_every_type() {
        let config = SplitterConfig::new(500, 50);

        for splitter_type in SplitterFactory::available_types() {
            let splitter = SplitterFactory::create(splitter_type, &config).unwrap();
            assert_eq!(splitter.name(), splitter_type.as_str());
        }
    }

    #[test]
    fn test_splitter_factory_unknown_name() {
        let result = SplitterFactory::create_by_name("semantic", &SplitterConfig::default());
        assert!(matches!(
            result,
            Err(DomainError::InvalidSplitterConfiguration { .. })
        ));
    }

    #[test]
    fn test_splitter_factory_rejects_bad_config_at_construction() {
        for splitter_type in SplitterType::ALL {
            let result = SplitterFactory::create(splitter_type, &SplitterConfig::new(10, 20));
            assert!(matches!(
                result,
                Err(DomainError::InvalidSplitterConfiguration { .. })
            ));
        }
    }

    #[test]
    fn test_splitter_factory_by_name() {
        let splitter =
            SplitterFactory::create_by_name("recursive_character", &SplitterConfig::new(100, 10))
                .unwrap();
        assert_eq!(splitter.name(), "recursive_character");
    }
}
