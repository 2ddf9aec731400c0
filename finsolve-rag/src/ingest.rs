//! One-time, idempotent ingestion into the singleton collection.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::dedup::deduplicate;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::loader::DocumentLoader;
use crate::vectorstore::VectorStore;

/// Outcome of an [`Ingestor::ingest`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestReport {
    /// The collection was (re)built with this many chunks.
    Created { chunk_count: usize },
    /// The collection already existed and was left untouched.
    AlreadyPresent,
}

/// The only write path into the index.
///
/// Calls are serialized by an async mutex held from the existence check
/// through the final insert, so a concurrent second call observes the
/// finished collection and does nothing.
pub struct Ingestor {
    loader: DocumentLoader,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
    lock: Mutex<()>,
}

impl Ingestor {
    pub fn new(
        loader: DocumentLoader,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self { loader, embedder, store, collection: collection.into(), lock: Mutex::new(()) }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Build the collection unless it already exists.
    ///
    /// With `force_reload`, an existing collection is dropped first. Chunks are
    /// loaded for every department, deduplicated on trimmed text (first
    /// occurrence wins), numbered `0..n` in load order, embedded, and inserted.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IngestError`] if a source file is unreadable or
    /// malformed, or if embedding or the index fails. A failure part-way
    /// leaves whatever the index already holds; nothing is rolled back.
    pub async fn ingest(&self, force_reload: bool) -> Result<IngestReport> {
        let _guard = self.lock.lock().await;
        let collection = self.collection.as_str();

        if force_reload && self.exists().await? {
            info!(collection, "force reload: dropping existing collection");
            self.store.delete_collection(collection).await.map_err(|e| self.index_error(e))?;
        }

        if self.exists().await? {
            info!(collection, "collection already exists, skipping ingest");
            return Ok(IngestReport::AlreadyPresent);
        }

        info!(collection, data_dir = %self.loader.data_dir().display(), "ingesting documents");
        let mut chunks = deduplicate(self.loader.load_all()?);
        for (id, chunk) in chunks.iter_mut().enumerate() {
            chunk.id = id as u64;
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(collection, error = %e, "embedding failed during ingest");
            RagError::ingest(collection, format!("embedding failed: {e}"))
        })?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::ingest(
                collection,
                format!("expected {} embeddings, got {}", chunks.len(), embeddings.len()),
            ));
        }
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.store
            .create_collection(collection, self.embedder.dimensions())
            .await
            .map_err(|e| self.index_error(e))?;
        self.store.insert(collection, &chunks).await.map_err(|e| self.index_error(e))?;

        let chunk_count = chunks.len();
        info!(collection, chunk_count, "ingest complete");
        Ok(IngestReport::Created { chunk_count })
    }

    async fn exists(&self) -> Result<bool> {
        self.store.collection_exists(&self.collection).await.map_err(|e| self.index_error(e))
    }

    fn index_error(&self, e: RagError) -> RagError {
        error!(collection = %self.collection, error = %e, "index operation failed during ingest");
        RagError::ingest(self.collection.clone(), e.to_string())
    }
}
