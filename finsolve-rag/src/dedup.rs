//! Removes chunks whose trimmed text has already been seen.

use std::collections::HashSet;

use crate::document::Chunk;

/// Keep the first chunk for each distinct trimmed text, preserving order.
pub fn deduplicate(chunks: Vec<Chunk>) -> Vec<Chunk> {
    let mut seen: HashSet<String> = HashSet::with_capacity(chunks.len());
    chunks
        .into_iter()
        .filter(|chunk| {
            let key = chunk.text.trim();
            !key.is_empty() && seen.insert(key.to_string())
        })
        .collect()
}
