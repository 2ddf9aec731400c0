//! Ingest behavior over an on-disk departmental corpus.

mod common;

use std::sync::Arc;

use finsolve_rag::{
    Department, DepartmentFilter, DocumentLoader, EmbeddingProvider, ErrorKind,
    HashingEmbeddingProvider, InMemoryVectorStore, IngestReport, Ingestor, RagConfig, VectorStore,
};

const COLLECTION: &str = "Departmental_Docs";

fn ingestor(data_dir: &std::path::Path, store: Arc<InMemoryVectorStore>) -> Ingestor {
    let loader = DocumentLoader::new(data_dir, &RagConfig::default());
    Ingestor::new(loader, Arc::new(HashingEmbeddingProvider::default()), store, COLLECTION)
}

async fn stored_chunks(store: &InMemoryVectorStore) -> Vec<(u64, String, Department)> {
    let query = HashingEmbeddingProvider::default().embed("anything").await.unwrap();
    let mut results = store
        .search(COLLECTION, &query, usize::MAX, &DepartmentFilter::new(Department::ALL))
        .await
        .unwrap();
    results.sort_by_key(|r| r.chunk.id);
    results
        .into_iter()
        .map(|r| (r.chunk.id, r.chunk.text, r.chunk.metadata.department))
        .collect()
}

#[tokio::test]
async fn engineering_docs_and_hr_rows_index_five_chunks() {
    let corpus = common::engineering_and_hr_corpus();
    let store = Arc::new(InMemoryVectorStore::new());

    let report = ingestor(corpus.path(), Arc::clone(&store)).ingest(false).await.unwrap();

    assert_eq!(report, IngestReport::Created { chunk_count: 5 });
    assert_eq!(store.count(COLLECTION).await.unwrap(), 5);

    let chunks = stored_chunks(&store).await;
    let ids: Vec<u64> = chunks.iter().map(|c| c.0).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    let departments: Vec<Department> = chunks.iter().map(|c| c.2).collect();
    assert_eq!(
        departments,
        vec![
            Department::Engineering,
            Department::Engineering,
            Department::Engineering,
            Department::Hr,
            Department::Hr,
        ]
    );
    assert!(chunks[3].1.contains("full_name: Aarav Sharma"));
    assert!(chunks[4].1.contains("leave_balance: 8"));
}

#[tokio::test]
async fn second_ingest_leaves_collection_untouched() {
    let corpus = common::engineering_and_hr_corpus();
    let store = Arc::new(InMemoryVectorStore::new());
    let ingestor = ingestor(corpus.path(), Arc::clone(&store));

    ingestor.ingest(false).await.unwrap();
    common::write(corpus.path(), "general/handbook.md", common::HANDBOOK_MD);

    assert_eq!(ingestor.ingest(false).await.unwrap(), IngestReport::AlreadyPresent);
    assert_eq!(store.count(COLLECTION).await.unwrap(), 5);
}

#[tokio::test]
async fn force_reload_rebuilds_deterministically() {
    let corpus = common::full_corpus();
    let store = Arc::new(InMemoryVectorStore::new());
    let ingestor = ingestor(corpus.path(), Arc::clone(&store));

    ingestor.ingest(false).await.unwrap();
    let before = stored_chunks(&store).await;

    assert_eq!(ingestor.ingest(true).await.unwrap(), IngestReport::Created { chunk_count: 7 });
    assert_eq!(stored_chunks(&store).await, before);
}

#[tokio::test]
async fn force_reload_picks_up_new_documents() {
    let corpus = common::engineering_and_hr_corpus();
    let store = Arc::new(InMemoryVectorStore::new());
    let ingestor = ingestor(corpus.path(), Arc::clone(&store));

    ingestor.ingest(false).await.unwrap();
    common::write(corpus.path(), "finance/quarterly.md", common::QUARTERLY_MD);

    assert_eq!(ingestor.ingest(true).await.unwrap(), IngestReport::Created { chunk_count: 6 });
}

#[tokio::test]
async fn duplicate_documents_are_indexed_once() {
    let corpus = common::engineering_and_hr_corpus();
    common::write(corpus.path(), "general/architecture_copy.md", common::ARCHITECTURE_MD);
    let store = Arc::new(InMemoryVectorStore::new());

    let report = ingestor(corpus.path(), Arc::clone(&store)).ingest(false).await.unwrap();

    assert_eq!(report, IngestReport::Created { chunk_count: 5 });
    let chunks = stored_chunks(&store).await;
    assert!(chunks.iter().all(|c| c.2 != Department::General), "first occurrence wins");
}

#[tokio::test]
async fn concurrent_ingests_build_the_collection_once() {
    let corpus = common::engineering_and_hr_corpus();
    let store = Arc::new(InMemoryVectorStore::new());
    let ingestor = Arc::new(ingestor(corpus.path(), Arc::clone(&store)));

    let (a, b) = tokio::join!(ingestor.ingest(false), ingestor.ingest(false));
    let mut reports = vec![a.unwrap(), b.unwrap()];
    reports.sort_by_key(|r| matches!(r, IngestReport::AlreadyPresent));

    assert_eq!(reports, vec![IngestReport::Created { chunk_count: 5 }, IngestReport::AlreadyPresent]);
    assert_eq!(store.count(COLLECTION).await.unwrap(), 5);
}

#[tokio::test]
async fn malformed_hr_table_aborts_ingest() {
    let corpus = common::engineering_and_hr_corpus();
    common::write(corpus.path(), "hr/hr_data.csv", "employee_id,full_name\nFINEMP1001\n");
    let store = Arc::new(InMemoryVectorStore::new());

    let err = ingestor(corpus.path(), Arc::clone(&store)).ingest(false).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Ingest);
    assert!(!store.collection_exists(COLLECTION).await.unwrap());
}

#[tokio::test]
async fn empty_data_directory_creates_an_empty_collection() {
    let corpus = tempfile::TempDir::new().unwrap();
    let store = Arc::new(InMemoryVectorStore::new());

    let report = ingestor(corpus.path(), Arc::clone(&store)).ingest(false).await.unwrap();

    assert_eq!(report, IngestReport::Created { chunk_count: 0 });
    assert!(store.collection_exists(COLLECTION).await.unwrap());
}
