//! Error types for the `finsolve-rag` crate.

use thiserror::Error;

/// Errors that can occur while ingesting, retrieving or answering.
#[derive(Debug, Error)]
pub enum RagError {
    /// Missing or invalid configuration (model identifier, credentials, limits).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A source document or the tabular file could not be ingested.
    #[error("Ingest error ({origin}): {message}")]
    IngestError {
        /// The file, directory or collection the failure relates to.
        origin: String,
        /// A description of the failure.
        message: String,
    },

    /// The requester's role is not recognized.
    #[error("Access denied: role '{role}' is not recognized")]
    AccessDenied {
        /// The rejected role identifier.
        role: String,
    },

    /// The index is missing or unreachable at query time.
    #[error("Retrieval error: {0}")]
    RetrievalError(String),

    /// The completion provider call failed or timed out.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The completion provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },
}

/// Coarse classification of a [`RagError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Ingest,
    AccessDenied,
    Retrieval,
    Generation,
    /// Raised by an embedding provider or vector store before being
    /// attributed to an ingest or retrieval step.
    Backend,
}

impl RagError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigError(_) => ErrorKind::Configuration,
            Self::IngestError { .. } => ErrorKind::Ingest,
            Self::AccessDenied { .. } => ErrorKind::AccessDenied,
            Self::RetrievalError(_) => ErrorKind::Retrieval,
            Self::GenerationError { .. } => ErrorKind::Generation,
            Self::EmbeddingError { .. } | Self::VectorStoreError { .. } => ErrorKind::Backend,
        }
    }

    pub(crate) fn ingest(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IngestError { origin: origin.into(), message: message.into() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
