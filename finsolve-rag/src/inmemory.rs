//! In-process vector store for single-process deployments.
//!
//! [`InMemoryVectorStore`] keeps every collection in a `tokio::sync::RwLock`
//! and scores by cosine similarity. Nothing is persisted: the collection is
//! rebuilt by the first ingest of each process.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::{DepartmentFilter, VectorStore};

#[derive(Debug)]
struct Collection {
    dimensions: usize,
    chunks: BTreeMap<u64, Chunk>,
}

/// A [`VectorStore`] held entirely in memory.
///
/// Each collection remembers the dimensionality it was created with and
/// rejects embeddings of any other size. Ties in score are broken by
/// ascending chunk id so results are deterministic.
///
/// # Example
///
/// ```rust,ignore
/// use finsolve_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("Departmental_Docs", 384).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn failure(message: String) -> RagError {
        RagError::VectorStoreError { backend: "InMemory".to_string(), message }
    }

    fn missing(collection: &str) -> RagError {
        Self::failure(format!("collection '{collection}' does not exist"))
    }

    fn check_dimensions(collection: &str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::failure(format!(
                "collection '{collection}' holds {expected}-dimensional vectors, got {actual}"
            )))
        }
    }
}

/// Cosine of the angle between `a` and `b`; zero when either has no magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| (dot + x * y, na + x * x, nb + y * y));
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        self.collections
            .write()
            .await
            .entry(name.to_string())
            .or_insert_with(|| Collection { dimensions, chunks: BTreeMap::new() });
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collections.read().await.contains_key(name))
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        if self.collections.write().await.remove(name).is_some() {
            debug!(collection = name, "dropped in-memory collection");
        }
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn insert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let target = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;
        for chunk in chunks {
            Self::check_dimensions(collection, target.dimensions, chunk.embedding.len())?;
        }
        target.chunks.extend(chunks.iter().map(|chunk| (chunk.id, chunk.clone())));
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        collections.get(collection).map(|c| c.chunks.len()).ok_or_else(|| Self::missing(collection))
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
        filter: &DepartmentFilter,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let source = collections.get(collection).ok_or_else(|| Self::missing(collection))?;
        Self::check_dimensions(collection, source.dimensions, embedding.len())?;

        let mut results: Vec<SearchResult> = source
            .chunks
            .values()
            .filter(|chunk| filter.matches(&chunk.metadata))
            .map(|chunk| SearchResult {
                chunk: chunk.clone(),
                score: cosine_similarity(&chunk.embedding, embedding),
            })
            .collect();

        // BTreeMap iteration is already id-ordered, so a stable sort keeps ties by id.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(top_k);
        Ok(results)
    }
}
