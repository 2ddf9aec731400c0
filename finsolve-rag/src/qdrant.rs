//! [Qdrant](https://qdrant.tech/) backend for the departmental index.
//!
//! This module is only available when the `qdrant` feature is enabled.
//!
//! Points use the chunk id as a numeric point id. The payload is flat:
//! `text`, `department` and `source` string fields. A [`DepartmentFilter`]
//! becomes a `must` keyword match on `department`, so filtering happens inside
//! Qdrant before the `top_k` cut.
//!
//! ```rust,ignore
//! use finsolve_rag::qdrant::QdrantVectorStore;
//!
//! let store = QdrantVectorStore::connect("http://localhost:6334")?;
//! ```

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, PointStruct,
    ScoredPoint, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use serde_json::json;
use tracing::debug;

use crate::document::{Chunk, ChunkMetadata, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::{DepartmentFilter, VectorStore};

const BACKEND: &str = "qdrant";

fn backend_error(message: impl Into<String>) -> RagError {
    RagError::VectorStoreError { backend: BACKEND.to_string(), message: message.into() }
}

fn client_error(e: QdrantError) -> RagError {
    backend_error(e.to_string())
}

/// A [`VectorStore`] talking to a Qdrant server over gRPC.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Build a client for the server at `url` (e.g. `http://localhost:6334`).
    ///
    /// No request is made until the first operation.
    pub fn connect(url: &str) -> Result<Self> {
        Ok(Self { client: Qdrant::from_url(url).build().map_err(client_error)? })
    }

    /// Wrap a client configured elsewhere (API key, TLS, timeouts).
    pub fn with_client(client: Qdrant) -> Self {
        Self { client }
    }
}

fn point_from_chunk(chunk: &Chunk) -> Result<PointStruct> {
    let payload: Payload = json!({
        "text": chunk.text,
        "department": chunk.metadata.department.as_str(),
        "source": chunk.metadata.source,
    })
    .try_into()
    .map_err(client_error)?;
    Ok(PointStruct::new(chunk.id, chunk.embedding.clone(), payload))
}

fn result_from_point(point: ScoredPoint) -> Result<SearchResult> {
    let Some(PointIdOptions::Num(id)) = point.id.and_then(|pid| pid.point_id_options) else {
        return Err(backend_error("search returned a point without a numeric id"));
    };

    let text_field = |name: &str| match point.payload.get(name).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    };
    let department = text_field("department")
        .and_then(|d| d.parse().ok())
        .ok_or_else(|| backend_error(format!("point {id} has no valid department")))?;

    Ok(SearchResult {
        chunk: Chunk {
            id,
            text: text_field("text").unwrap_or_default(),
            metadata: ChunkMetadata::new(department, text_field("source").unwrap_or_default()),
            embedding: Vec::new(),
        },
        score: point.score,
    })
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        if self.collection_exists(name).await? {
            return Ok(());
        }
        let vectors = VectorParamsBuilder::new(dimensions as u64, Distance::Cosine);
        self.client
            .create_collection(CreateCollectionBuilder::new(name).vectors_config(vectors))
            .await
            .map_err(client_error)?;
        debug!(collection = name, dimensions, "qdrant collection created");
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        self.client.collection_exists(name).await.map_err(client_error)
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        if self.collection_exists(name).await? {
            self.client.delete_collection(name).await.map_err(client_error)?;
            debug!(collection = name, "qdrant collection dropped");
        }
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let listing = self.client.list_collections().await.map_err(client_error)?;
        let mut names: Vec<String> = listing.collections.into_iter().map(|c| c.name).collect();
        names.sort();
        Ok(names)
    }

    async fn insert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let points = chunks.iter().map(point_from_chunk).collect::<Result<Vec<_>>>()?;
        if points.is_empty() {
            return Ok(());
        }
        let count = points.len();
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(client_error)?;
        debug!(collection, count, "points upserted");
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let counted = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(client_error)?;
        Ok(counted.result.map_or(0, |r| r.count as usize))
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
        filter: &DepartmentFilter,
    ) -> Result<Vec<SearchResult>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        let departments: Vec<String> =
            filter.departments().iter().map(|d| d.as_str().to_string()).collect();
        let request = SearchPointsBuilder::new(collection, embedding.to_vec(), top_k as u64)
            .filter(Filter::must([Condition::matches("department", departments)]))
            .with_payload(true);

        let found = self.client.search_points(request).await.map_err(client_error)?;
        found.result.into_iter().map(result_from_point).collect()
    }
}
