//! Shared fixtures: an on-disk departmental corpus and scripted completion providers.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use finsolve_rag::{
    CompletionProvider, Gateway, GenerationConfig, HashingEmbeddingProvider, InMemoryVectorStore,
    RagConfig, RagError, Result,
};
use tempfile::TempDir;
use tokio::sync::Mutex;

pub const ARCHITECTURE_MD: &str = "# System Architecture

FinSolve services run as containers on a managed Kubernetes cluster. Each microservice owns its database schema and publishes domain events to a shared message bus.

## Deployment

Releases ship through a blue green pipeline. Canary pods receive five percent of traffic before promotion.";

pub const RUNBOOK_MD: &str = "# Incident Runbook

## Paging

The on-call engineer acknowledges alerts within five minutes. Escalate to the platform lead when a service level objective burns more than two percent of its monthly error budget in one hour.

## Rollback

Revert the deployment with the pipeline rollback job. Confirm that the container image digest matches the previous release, then watch latency dashboards for fifteen minutes before closing the incident.

## Postmortem

Write a blameless postmortem within three business days. Record the timeline, the contributing factors, the detection gap, and every follow-up ticket with an owner and a due date.";

pub const QUARTERLY_MD: &str = "# Quarterly Financial Report

## Q4 Highlights

Revenue grew 28 percent year over year. Gross margin reached 64 percent on lower cloud hosting costs.";

pub const HANDBOOK_MD: &str = "# Employee Handbook

Office hours run from nine to six on weekdays. Visitors sign in at the front desk.";

pub const HR_CSV: &str = "employee_id,full_name,role,department,leave_balance
FINEMP1001,Aarav Sharma,Credit Analyst,Finance,12
FINEMP1002,Meera Iyer,Recruiter,HR,8
";

/// Engineering (architecture.md: 1 chunk, runbook.md: 2 chunks) plus two HR rows.
pub fn engineering_and_hr_corpus() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "engineering/architecture.md", ARCHITECTURE_MD);
    write(dir.path(), "engineering/runbook.md", RUNBOOK_MD);
    write(dir.path(), "hr/hr_data.csv", HR_CSV);
    dir
}

/// The engineering and HR corpus plus one finance and one general document.
pub fn full_corpus() -> TempDir {
    let dir = engineering_and_hr_corpus();
    write(dir.path(), "finance/quarterly.md", QUARTERLY_MD);
    write(dir.path(), "general/handbook.md", HANDBOOK_MD);
    dir
}

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn rag_config(similarity_threshold: f32) -> RagConfig {
    RagConfig::builder().similarity_threshold(similarity_threshold).build().unwrap()
}

/// A gateway over the in-memory store with the hashing embedder.
pub fn gateway(
    data_dir: &Path,
    config: RagConfig,
    completion: Arc<dyn CompletionProvider>,
    timeout: Duration,
) -> Gateway {
    let mut generation = GenerationConfig::new("test-model", "test-key");
    generation.timeout = timeout;
    Gateway::builder()
        .config(config)
        .data_dir(data_dir)
        .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .completion_provider(completion)
        .generation(generation)
        .build()
        .unwrap()
}

/// Records every prompt and answers with a fixed text.
#[derive(Default)]
pub struct RecordingProvider {
    pub prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl RecordingProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, _model: &str, prompt: &str, _temperature: f32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(prompt.to_string());
        Ok("answer from context".to_string())
    }
}

/// Sleeps before answering.
pub struct SlowProvider(pub Duration);

#[async_trait]
impl CompletionProvider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    async fn complete(&self, _model: &str, _prompt: &str, _temperature: f32) -> Result<String> {
        tokio::time::sleep(self.0).await;
        Ok("too late".to_string())
    }
}

/// Always fails as an unreachable endpoint would.
pub struct FailingProvider;

#[async_trait]
impl CompletionProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _model: &str, _prompt: &str, _temperature: f32) -> Result<String> {
        Err(RagError::GenerationError {
            provider: "failing".to_string(),
            message: "connection refused".to_string(),
        })
    }
}
