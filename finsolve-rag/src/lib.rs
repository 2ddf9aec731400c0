//! # finsolve-rag
//!
//! Role-scoped retrieval-augmented question answering over departmental documents.
//!
//! ## Overview
//!
//! Documents are grouped by owning [`Department`]. Ingest loads every department's
//! markdown files plus the HR table, chunks them, drops duplicate texts, embeds
//! what remains and writes it to a single collection. A query is answered only
//! from chunks whose department the requester's role may see:
//!
//! ```text
//! role ─► AccessPolicy ─► allowed departments
//! query ─► Retriever (filtered similarity search) ─► PromptComposer ─► AnswerGenerator
//! ```
//!
//! When nothing relevant is retrieved the [`NO_INFORMATION_ANSWER`] sentinel is
//! returned without calling the model.
//!
//! ## Backends
//!
//! | Feature | Provides |
//! |---------|----------|
//! | *(none)* | [`HashingEmbeddingProvider`], [`InMemoryVectorStore`] |
//! | `openai` | OpenAI-compatible embeddings and chat completions (Groq by default) |
//! | `qdrant` | Qdrant vector store |
//! | `fastembed` | Local all-MiniLM-L6-v2 embeddings |
//! | `full` | All of the above |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use finsolve_rag::{Gateway, Resources, Settings};
//!
//! let settings = Settings::from_env()?;
//! let gateway = Gateway::builder()
//!     .config(settings.rag.clone())
//!     .data_dir(&settings.data_dir)
//!     .generation(settings.generation.clone())
//!     .resources(Resources::from_settings(&settings)?)
//!     .build()?;
//!
//! gateway.policy().authorize("finance")?;
//! gateway.ingest(false).await?;
//! let answer = gateway.ask("What was the Q4 gross margin?", "finance").await?;
//! println!("{}", answer.text);
//! ```

pub mod chunking;
pub mod config;
pub mod dedup;
pub mod department;
pub mod document;
pub mod embedding;
pub mod error;
pub mod gateway;
pub mod generation;
pub mod ingest;
pub mod inmemory;
pub mod loader;
pub mod policy;
pub mod prompt;
pub mod resources;
pub mod retriever;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod chat;
#[cfg(feature = "fastembed")]
pub mod minilm;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use chunking::{Chunker, MarkdownChunker, RecursiveChunker, TextSplitter};
pub use config::{EmbedderKind, GenerationConfig, RagConfig, RagConfigBuilder, Settings};
pub use dedup::deduplicate;
pub use department::{Department, UnknownDepartment};
pub use document::{Chunk, ChunkMetadata, Document, SearchResult};
pub use embedding::{EmbeddingProvider, HashingEmbeddingProvider};
pub use error::{ErrorKind, RagError, Result};
pub use gateway::{Answer, Gateway, GatewayBuilder};
pub use generation::{AnswerGenerator, CompletionProvider};
pub use ingest::{IngestReport, Ingestor};
pub use inmemory::InMemoryVectorStore;
pub use loader::DocumentLoader;
pub use policy::{AccessPolicy, FULL_ACCESS_ROLE};
pub use prompt::{Composition, NO_INFORMATION_ANSWER, PromptComposer};
pub use resources::Resources;
pub use retriever::Retriever;
pub use vectorstore::{DepartmentFilter, VectorStore};

#[cfg(feature = "openai")]
pub use chat::ChatCompletionProvider;
#[cfg(feature = "fastembed")]
pub use minilm::FastEmbedProvider;
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
