//! Vector store trait for storing and searching vector embeddings.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::department::Department;
use crate::document::{Chunk, ChunkMetadata, SearchResult};
use crate::error::Result;

/// Metadata predicate restricting a search to a set of departments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentFilter {
    departments: BTreeSet<Department>,
}

impl DepartmentFilter {
    pub fn new(departments: impl IntoIterator<Item = Department>) -> Self {
        Self { departments: departments.into_iter().collect() }
    }

    /// Whether a chunk with this metadata passes the filter.
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        self.departments.contains(&metadata.department)
    }

    pub fn departments(&self) -> &BTreeSet<Department> {
        &self.departments
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }
}

/// A storage backend for chunk embeddings with filtered similarity search.
///
/// Implementations manage named collections of [`Chunk`]s keyed by chunk id.
///
/// # Example
///
/// ```rust,ignore
/// use finsolve_rag::{InMemoryVectorStore, VectorStore, DepartmentFilter, Department};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("Departmental_Docs", 384).await?;
/// store.insert("Departmental_Docs", &chunks).await?;
/// let filter = DepartmentFilter::new([Department::Hr, Department::General]);
/// let results = store.search("Departmental_Docs", &query_embedding, 5, &filter).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection. No-op if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Whether a collection with this name exists.
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Delete a named collection and all its data. No-op if it does not exist.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Names of all collections held by the backend.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Insert chunks into an existing collection. Chunks must have ids and
    /// embeddings set; a chunk with an id already present replaces it.
    async fn insert(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Number of chunks stored in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Search for the `top_k` chunks most similar to `embedding` among those
    /// whose metadata matches `filter`.
    ///
    /// Returns results ordered by descending similarity score.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
        filter: &DepartmentFilter,
    ) -> Result<Vec<SearchResult>>;
}
