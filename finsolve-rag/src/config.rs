//! Configuration for ingestion, retrieval and generation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Name of the singleton collection holding every indexed chunk.
pub const DEFAULT_COLLECTION: &str = "Departmental_Docs";

/// Groq's OpenAI-compatible API base URL.
pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Configuration parameters for chunking and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Maximum number of chunks returned per query.
    pub top_k: usize,
    /// Minimum similarity score for results. `None` keeps every filtered hit
    /// up to `top_k`, whatever its score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f32>,
    /// Name of the vector collection.
    pub collection: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 20,
            top_k: 5,
            similarity_threshold: None,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the maximum number of chunks returned per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Drop results scoring below `threshold`.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = Some(threshold);
        self
    }

    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - the collection name is empty
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.config.collection.trim().is_empty() {
            return Err(RagError::ConfigError("collection name must not be empty".to_string()));
        }
        Ok(self.config)
    }
}

/// Settings for the completion provider.
#[derive(Clone)]
pub struct GenerationConfig {
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer credential for the provider.
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on a single completion round-trip.
    pub timeout: Duration,
}

impl GenerationConfig {
    /// Settings for `model` with default endpoint, temperature and timeout.
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
            temperature: 0.5,
            timeout: Duration::from_secs(60),
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Which embedding backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedderKind {
    /// Offline feature-hashing embedder.
    #[default]
    Hashing,
    /// OpenAI-compatible embeddings API (feature `openai`).
    OpenAI,
    /// Local all-MiniLM-L6-v2 via fastembed (feature `fastembed`).
    FastEmbed,
}

impl FromStr for EmbedderKind {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hashing" => Ok(Self::Hashing),
            "openai" => Ok(Self::OpenAI),
            "fastembed" => Ok(Self::FastEmbed),
            other => Err(RagError::ConfigError(format!(
                "unknown embedder '{other}' (expected hashing, openai or fastembed)"
            ))),
        }
    }
}

/// Process-wide settings read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root directory holding one subdirectory per department.
    pub data_dir: PathBuf,
    pub rag: RagConfig,
    pub embedder: EmbedderKind,
    /// Qdrant gRPC URL; the in-memory store is used when absent.
    pub qdrant_url: Option<String>,
    pub generation: GenerationConfig,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable if set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `GROQ_MODEL` or `GROQ_API_KEY` is
    /// missing, or if a numeric variable cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| RagError::ConfigError(format!("{key} must be set")))
        };

        let mut rag = RagConfig::builder();
        if let Some(collection) = get("FINSOLVE_COLLECTION") {
            rag = rag.collection(collection);
        }
        if let Some(top_k) = parse_var(&get, "FINSOLVE_TOP_K")? {
            rag = rag.top_k(top_k);
        }
        if let Some(threshold) = parse_var(&get, "FINSOLVE_SIMILARITY_THRESHOLD")? {
            rag = rag.similarity_threshold(threshold);
        }

        let mut generation = GenerationConfig::new(required("GROQ_MODEL")?, required("GROQ_API_KEY")?);
        if let Some(base_url) = get("GROQ_BASE_URL") {
            generation.base_url = base_url;
        }
        if let Some(temperature) = parse_var(&get, "GROQ_TEMPERATURE")? {
            generation.temperature = temperature;
        }
        if let Some(secs) = parse_var::<u64>(&get, "GROQ_TIMEOUT_SECS")? {
            generation.timeout = Duration::from_secs(secs);
        }

        Ok(Self {
            data_dir: get("FINSOLVE_DATA_DIR").map_or_else(|| PathBuf::from("data"), PathBuf::from),
            rag: rag.build()?,
            embedder: get("FINSOLVE_EMBEDDER").map(|v| v.parse::<EmbedderKind>()).transpose()?.unwrap_or_default(),
            qdrant_url: get("QDRANT_URL"),
            generation,
        })
    }
}

fn parse_var<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    get(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|_| RagError::ConfigError(format!("{key} has invalid value '{raw}'")))
        })
        .transpose()
}
