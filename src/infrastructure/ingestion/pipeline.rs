//! Two-tier ingestion pipeline

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::domain::ingestion::{
    count_tokens, BatchIngestionResult, ChildChunk, DocumentSegment, IngestionResult,
    IngestionSettings, TextSplitter,
};
use crate::domain::parent_chunk::{ParentChunk, ParentChunkRepository};
use crate::domain::{DomainError, IngestionStage};

use super::dedup::{ChunkDeduplicator, DedupOutcome};
use super::factory::{LoaderRegistry, SplitterFactory};

/// Where a parent chunk of the current document comes from
enum PlannedParent {
    /// Not stored yet; children were split from it
    New {
        chunk: ParentChunk,
        children: Vec<ChildChunk>,
    },
    /// Already persisted by an earlier ingestion
    Stored(ParentChunk),
    /// Same content as an earlier chunk of this document
    Repeat(usize),
}

/// Pipeline turning files into deduplicated parent chunks and their children.
///
/// A document runs detect, load, parent split, then per parent hash,
/// dedup check and child split. Nothing is persisted until every loader
/// and splitter step for the document has succeeded.
pub struct IngestionPipeline<R>
where
    R: ParentChunkRepository + ?Sized,
{
    loaders: LoaderRegistry,
    parent_splitter: Arc<dyn TextSplitter>,
    child_splitter: Arc<dyn TextSplitter>,
    dedup: ChunkDeduplicator<R>,
}

impl<R: ParentChunkRepository + ?Sized> fmt::Debug for IngestionPipeline<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("loaders", &self.loaders.supported_types())
            .field("parent_splitter", &self.parent_splitter.name())
            .field("child_splitter", &self.child_splitter.name())
            .finish()
    }
}

impl<R: ParentChunkRepository + ?Sized> IngestionPipeline<R> {
    /// Create a pipeline with the built-in loaders and the configured splitters
    pub fn new(repository: Arc<R>, settings: &IngestionSettings) -> Result<Self, DomainError> {
        settings.validate()?;

        let parent_splitter =
            SplitterFactory::create(settings.parent.splitter, &settings.parent.splitter_config())?;
        let child_splitter =
            SplitterFactory::create(settings.child.splitter, &settings.child.splitter_config())?;

        Ok(Self {
            loaders: LoaderRegistry::new(),
            parent_splitter,
            child_splitter,
            dedup: ChunkDeduplicator::new(repository),
        })
    }

    pub fn with_loaders(mut self, loaders: LoaderRegistry) -> Self {
        self.loaders = loaders;
        self
    }

    pub fn with_splitters(
        mut self,
        parent: Arc<dyn TextSplitter>,
        child: Arc<dyn TextSplitter>,
    ) -> Self {
        self.parent_splitter = parent;
        self.child_splitter = child;
        self
    }

    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    pub fn repository(&self) -> &Arc<R> {
        self.dedup.repository()
    }

    /// Ingest a single document.
    ///
    /// Loader and splitter failures are wrapped in `DomainError::Ingestion`
    /// with the failing stage. Persistence errors are returned as-is.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn ingest(&self, path: &Path) -> Result<IngestionResult, DomainError> {
        let display = path.display().to_string();
        let fail = |stage: IngestionStage| {
            let display = display.clone();
            move |e: DomainError| DomainError::ingestion(display, stage, e)
        };

        let (document_type, loader) = self
            .loaders
            .loader_for_path(path)
            .await
            .map_err(fail(IngestionStage::Detect))?;

        let segments = loader.load(path).await.map_err(fail(IngestionStage::Load))?;
        debug!(%document_type, segments = segments.len(), "Loaded document");

        let parent_segments = self
            .parent_splitter
            .split_segments(&segments)
            .map_err(fail(IngestionStage::ParentSplit))?;

        let mut planned = Vec::with_capacity(parent_segments.len());
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for (index, segment) in parent_segments.into_iter().enumerate() {
            let token_count = count_tokens(&segment.content);
            let chunk = ParentChunk::new(segment.content, index, segment.metadata)
                .with_token_count(token_count);

            if let Some(&first) = first_seen.get(chunk.content_hash()) {
                planned.push(PlannedParent::Repeat(first));
                continue;
            }
            first_seen.insert(chunk.content_hash().to_string(), index);

            if let Some(stored) = self.dedup.find_existing(chunk.content_hash()).await? {
                debug!(content_hash = %stored.content_hash(), "Reusing stored parent chunk");
                planned.push(PlannedParent::Stored(stored));
                continue;
            }

            let children = self
                .split_children(&chunk)
                .map_err(fail(IngestionStage::ChildSplit))?;
            planned.push(PlannedParent::New { chunk, children });
        }

        let mut parent_chunks: Vec<ParentChunk> = Vec::with_capacity(planned.len());
        let mut child_chunks = Vec::new();
        let mut created = 0;
        let mut reused = 0;

        for plan in planned {
            let chunk = match plan {
                PlannedParent::New { chunk, children } => {
                    match self.dedup.insert_or_existing(chunk).await? {
                        DedupOutcome::Created(chunk) => {
                            created += 1;
                            child_chunks.extend(children);
                            chunk
                        }
                        DedupOutcome::Existing(chunk) => {
                            reused += 1;
                            chunk
                        }
                    }
                }
                PlannedParent::Stored(chunk) => {
                    reused += 1;
                    chunk
                }
                PlannedParent::Repeat(first) => {
                    reused += 1;
                    parent_chunks[first].clone()
                }
            };

            parent_chunks.push(chunk);
        }

        info!(
            %document_type,
            parents = parent_chunks.len(),
            children = child_chunks.len(),
            created,
            reused,
            "Ingested document"
        );

        Ok(IngestionResult {
            path: path.to_path_buf(),
            document_type,
            parent_chunks,
            child_chunks,
            created,
            reused,
        })
    }

    /// Ingest several documents, at most `concurrency` at a time.
    ///
    /// Results arrive in completion order. Failed documents are reported in
    /// `failures` and do not stop the others.
    pub async fn ingest_many(&self, paths: &[PathBuf], concurrency: usize) -> BatchIngestionResult {
        let outcomes: Vec<(PathBuf, Result<IngestionResult, DomainError>)> =
            stream::iter(paths.iter().cloned())
                .map(|path| async move {
                    let result = self.ingest(&path).await;
                    (path, result)
                })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

        let mut batch = BatchIngestionResult::new();

        for (path, result) in outcomes {
            if let Err(ref e) = result {
                warn!(path = %path.display(), error = %e, "Document ingestion failed");
            }
            batch.add(path, result);
        }

        batch
    }

    fn split_children(&self, parent: &ParentChunk) -> Result<Vec<ChildChunk>, DomainError> {
        let segment = DocumentSegment {
            content: parent.content().to_string(),
            metadata: parent.metadata().clone(),
        };

        Ok(self
            .child_splitter
            .split_segment(&segment)?
            .into_iter()
            .enumerate()
            .map(|(index, child)| ChildChunk::new(*parent.id(), child.content, index, child.metadata))
            .collect())
    }
}
