//! Property tests for in-memory vector store search ordering and department filtering.

use finsolve_rag::department::Department;
use finsolve_rag::document::{Chunk, ChunkMetadata};
use finsolve_rag::inmemory::InMemoryVectorStore;
use finsolve_rag::vectorstore::{DepartmentFilter, VectorStore};
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

fn arb_department() -> impl Strategy<Value = Department> {
    proptest::sample::select(Department::ALL.to_vec())
}

/// Generate chunk bodies (department, text, embedding); ids are assigned in order.
fn arb_chunks(dim: usize) -> impl Strategy<Value = Vec<Chunk>> {
    proptest::collection::vec(
        (arb_department(), "[a-z ]{5,30}", arb_normalized_embedding(dim)),
        1..20,
    )
    .prop_map(|bodies| {
        bodies
            .into_iter()
            .enumerate()
            .map(|(i, (department, text, embedding))| Chunk {
                id: i as u64,
                text,
                metadata: ChunkMetadata::new(department, format!("{department}.md")),
                embedding,
            })
            .collect()
    })
}

fn search(
    chunks: &[Chunk],
    query: &[f32],
    top_k: usize,
    filter: &DepartmentFilter,
) -> Vec<finsolve_rag::document::SearchResult> {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let store = InMemoryVectorStore::new();
        store.create_collection("test", query.len()).await.unwrap();
        store.insert("test", chunks).await.unwrap();
        store.search("test", query, top_k, filter).await.unwrap()
    })
}

/// *For any* set of chunks, searching returns results ordered by descending
/// cosine similarity, at most `top_k` of them.
mod prop_inmemory_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_top_k(
            chunks in arb_chunks(DIM),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let filter = DepartmentFilter::new(Department::ALL);
            let results = search(&chunks, &query, top_k, &filter);

            prop_assert!(results.len() <= top_k);
            prop_assert_eq!(results.len(), top_k.min(chunks.len()));

            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}

/// *For any* department subset, no result comes from a department outside it,
/// and the filter is applied before the `top_k` cut.
mod prop_inmemory_department_filter {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_never_leave_the_allowed_departments(
            chunks in arb_chunks(DIM),
            query in arb_normalized_embedding(DIM),
            allowed in proptest::sample::subsequence(Department::ALL.to_vec(), 0..=5),
            top_k in 1usize..25,
        ) {
            let filter = DepartmentFilter::new(allowed.iter().copied());
            let results = search(&chunks, &query, top_k, &filter);

            for result in &results {
                prop_assert!(allowed.contains(&result.chunk.metadata.department));
            }

            let eligible = chunks.iter().filter(|c| allowed.contains(&c.metadata.department)).count();
            prop_assert_eq!(results.len(), top_k.min(eligible));
        }
    }
}

#[tokio::test]
async fn equal_scores_are_ordered_by_id() {
    let store = InMemoryVectorStore::new();
    store.create_collection("ties", 2).await.unwrap();
    let chunks: Vec<Chunk> = [2u64, 0, 1]
        .into_iter()
        .map(|id| Chunk {
            id,
            text: format!("chunk {id}"),
            metadata: ChunkMetadata::new(Department::General, "handbook.md"),
            embedding: vec![1.0, 0.0],
        })
        .collect();
    store.insert("ties", &chunks).await.unwrap();

    let results =
        store.search("ties", &[1.0, 0.0], 3, &DepartmentFilter::new(Department::ALL)).await.unwrap();
    let ids: Vec<u64> = results.iter().map(|r| r.chunk.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[tokio::test]
async fn searching_a_missing_collection_fails() {
    let store = InMemoryVectorStore::new();
    let err = store
        .search("absent", &[1.0], 1, &DepartmentFilter::new(Department::ALL))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("absent"));
}
