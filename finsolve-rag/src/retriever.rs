//! Department-scoped similarity search.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, error};

use crate::config::RagConfig;
use crate::department::Department;
use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::{DepartmentFilter, VectorStore};

/// Executes similarity queries constrained to an allowed department set.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
    top_k: usize,
    similarity_threshold: Option<f32>,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: &RagConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: config.collection.clone(),
            top_k: config.top_k,
            similarity_threshold: config.similarity_threshold,
        }
    }

    /// Return up to `top_k` chunks from `allowed` departments, best first.
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::RetrievalError`] if the collection has not been
    /// ingested, or if embedding the query or searching the index fails.
    pub async fn retrieve(
        &self,
        query: &str,
        allowed: &BTreeSet<Department>,
    ) -> Result<Vec<SearchResult>> {
        let collection = self.collection.as_str();

        let exists = self.store.collection_exists(collection).await.map_err(|e| {
            error!(collection, error = %e, "index unreachable");
            RagError::RetrievalError(format!("index unreachable: {e}"))
        })?;
        if !exists {
            error!(collection, "query before ingest");
            return Err(RagError::RetrievalError(format!(
                "collection '{collection}' has not been ingested"
            )));
        }

        let embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            RagError::RetrievalError(format!("query embedding failed: {e}"))
        })?;

        let filter = DepartmentFilter::new(allowed.iter().copied());
        let results = self
            .store
            .search(collection, &embedding, self.top_k, &filter)
            .await
            .map_err(|e| {
                error!(collection, error = %e, "vector store search failed");
                RagError::RetrievalError(format!("search failed in collection '{collection}': {e}"))
            })?;

        let results: Vec<SearchResult> = results
            .into_iter()
            .filter(|r| filter.matches(&r.chunk.metadata))
            .filter(|r| self.similarity_threshold.is_none_or(|min| r.score >= min))
            .take(self.top_k)
            .collect();

        debug!(collection, result_count = results.len(), "retrieval completed");
        Ok(results)
    }
}
