//! Data types for documents, chunks, and search results.

use serde::{Deserialize, Serialize};

use crate::department::Department;

/// Origin of a document or chunk: the owning department and the source file name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChunkMetadata {
    /// The department the content belongs to.
    pub department: Department,
    /// File name of the source document (e.g. `hr_data.csv`).
    pub source: String,
}

impl ChunkMetadata {
    pub fn new(department: Department, source: impl Into<String>) -> Self {
        Self { department, source: source.into() }
    }
}

/// A source document read from disk, or one rendered row of the HR table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The raw text content.
    pub text: String,
    /// Department and source file.
    pub metadata: ChunkMetadata,
}

/// A bounded-size slice of a [`Document`], the unit of indexing and retrieval.
///
/// Chunks produced by a [`Chunker`](crate::chunking::Chunker) carry id `0`
/// and an empty embedding; the ingestor assigns sequential ids after
/// deduplication and attaches embeddings before insertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Sequential identifier assigned at insert time.
    pub id: u64,
    /// The text content of the chunk.
    pub text: String,
    /// Department and source inherited from the parent document.
    pub metadata: ChunkMetadata,
    /// The vector embedding for this chunk's text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// The external identifier of this chunk (`id_{n}`).
    pub fn key(&self) -> String {
        format!("id_{}", self.id)
    }
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}
