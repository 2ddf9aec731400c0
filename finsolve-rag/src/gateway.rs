//! Query entrypoint and ingest trigger.
//!
//! The [`Gateway`] wires the access policy, retriever, prompt composer and
//! answer generator together for queries, and owns the [`Ingestor`] that
//! builds the collection.
//!
//! # Example
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
//! gateway.ingest(false).await?;
//! let answer = gateway.ask("Which quarter had the best CPA?", "marketing").await?;
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::config::{GenerationConfig, RagConfig};
use crate::department::Department;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::{AnswerGenerator, CompletionProvider};
use crate::ingest::{IngestReport, Ingestor};
use crate::loader::DocumentLoader;
use crate::policy::AccessPolicy;
use crate::prompt::{Composition, PromptComposer};
use crate::resources::Resources;
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// The result of a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    /// The model's answer, or the no-information sentinel.
    pub text: String,
    /// The requester's role as given.
    pub role: String,
    /// The role resolved to a department; `None` for roles that do not name one.
    pub department: Option<Department>,
    /// Distinct source files placed in the prompt, in retrieval order.
    pub sources: Vec<String>,
    /// True when retrieval was empty and the model was not called.
    pub short_circuited: bool,
}

/// Role-scoped question answering over the departmental collection.
///
/// Construct one via [`Gateway::builder()`]. Queries share nothing mutable
/// but the collection, so a `Gateway` can be wrapped in an `Arc` and used
/// from many tasks at once.
pub struct Gateway {
    policy: AccessPolicy,
    ingestor: Ingestor,
    retriever: Retriever,
    composer: PromptComposer,
    generator: AnswerGenerator,
    store: Arc<dyn VectorStore>,
}

impl Gateway {
    /// Create a new [`GatewayBuilder`].
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::default()
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn collection(&self) -> &str {
        self.ingestor.collection()
    }

    /// Build the collection if absent; with `force_reload`, rebuild it.
    ///
    /// See [`Ingestor::ingest`].
    pub async fn ingest(&self, force_reload: bool) -> Result<IngestReport> {
        self.ingestor.ingest(force_reload).await
    }

    /// Departments visible to `role` under the configured policy.
    pub fn allowed_departments(&self, role: &str) -> BTreeSet<Department> {
        self.policy.allowed_departments(role)
    }

    /// Answer `query` for a requester holding `role`.
    ///
    /// The role is assumed to have been recognized by the caller (see
    /// [`AccessPolicy::authorize`]). When nothing is retrieved the
    /// no-information sentinel is returned and the model is not called.
    ///
    /// # Errors
    ///
    /// - [`RagError::RetrievalError`] if the collection is missing or the index fails
    /// - [`RagError::GenerationError`] if the completion call fails or times out
    #[instrument(skip(self, query), fields(collection = %self.collection()))]
    pub async fn ask(&self, query: &str, role: &str) -> Result<Answer> {
        let allowed = self.policy.allowed_departments(role);
        info!(departments = ?allowed, "filtered");

        let results = self.retriever.retrieve(query, &allowed).await?;
        info!(result_count = results.len(), "retrieved");

        let mut sources: Vec<String> = Vec::new();
        for result in &results {
            if !sources.contains(&result.chunk.metadata.source) {
                sources.push(result.chunk.metadata.source.clone());
            }
        }

        let (text, short_circuited) = match self.composer.compose(query, role, &results) {
            Composition::ShortCircuit(sentinel) => {
                info!("no relevant context, returning sentinel answer");
                (sentinel.to_string(), true)
            }
            Composition::Prompt(prompt) => {
                let text = self.generator.generate(&prompt).await?;
                info!(model = %self.generator.model(), answer_len = text.len(), "generated");
                (text, false)
            }
        };

        Ok(Answer {
            text,
            role: role.to_string(),
            department: role.parse().ok(),
            sources,
            short_circuited,
        })
    }

    /// Names of all collections in the backing store.
    pub async fn collections(&self) -> Result<Vec<String>> {
        self.store
            .list_collections()
            .await
            .map_err(|e| RagError::RetrievalError(format!("index unreachable: {e}")))
    }

    /// Number of chunks in the collection, or `None` if it has not been ingested.
    pub async fn chunk_count(&self) -> Result<Option<usize>> {
        let collection = self.collection();
        let unreachable = |e: RagError| RagError::RetrievalError(format!("index unreachable: {e}"));
        if !self.store.collection_exists(collection).await.map_err(unreachable)? {
            return Ok(None);
        }
        self.store.count(collection).await.map(Some).map_err(unreachable)
    }
}

/// Builder for constructing a [`Gateway`].
///
/// `data_dir`, `embedding_provider`, `vector_store`, `completion_provider` and
/// `generation` are required; the config, policy and composer default.
#[derive(Default)]
pub struct GatewayBuilder {
    config: Option<RagConfig>,
    data_dir: Option<PathBuf>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    completion_provider: Option<Arc<dyn CompletionProvider>>,
    generation: Option<GenerationConfig>,
    policy: Option<AccessPolicy>,
    composer: Option<PromptComposer>,
}

impl GatewayBuilder {
    /// Set the chunking and retrieval configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the root directory of the department document sets.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the completion provider.
    pub fn completion_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.completion_provider = Some(provider);
        self
    }

    /// Set embedder, store and completion provider from one [`Resources`] bundle.
    pub fn resources(self, resources: Resources) -> Self {
        self.embedding_provider(resources.embedder)
            .vector_store(resources.store)
            .completion_provider(resources.completion)
    }

    /// Set the model, temperature and timeout for generation.
    pub fn generation(mut self, config: GenerationConfig) -> Self {
        self.generation = Some(config);
        self
    }

    /// Replace the default five-department access policy.
    pub fn policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Replace the default prompt composer.
    pub fn composer(mut self, composer: PromptComposer) -> Self {
        self.composer = Some(composer);
        self
    }

    /// Build the [`Gateway`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing or
    /// the generation model is empty.
    pub fn build(self) -> Result<Gateway> {
        let missing = |field: &str| RagError::ConfigError(format!("{field} is required"));

        let config = self.config.unwrap_or_default();
        let data_dir = self.data_dir.ok_or_else(|| missing("data_dir"))?;
        let embedder = self.embedding_provider.ok_or_else(|| missing("embedding_provider"))?;
        let store = self.vector_store.ok_or_else(|| missing("vector_store"))?;
        let completion = self.completion_provider.ok_or_else(|| missing("completion_provider"))?;
        let generation = self.generation.ok_or_else(|| missing("generation"))?;
        if generation.model.trim().is_empty() {
            return Err(RagError::ConfigError("generation model must not be empty".to_string()));
        }

        let loader = DocumentLoader::new(data_dir, &config);
        Ok(Gateway {
            policy: self.policy.unwrap_or_default(),
            ingestor: Ingestor::new(
                loader,
                Arc::clone(&embedder),
                Arc::clone(&store),
                config.collection.clone(),
            ),
            retriever: Retriever::new(embedder, Arc::clone(&store), &config),
            composer: self.composer.unwrap_or_default(),
            generator: AnswerGenerator::new(completion, &generation),
            store,
        })
    }
}
