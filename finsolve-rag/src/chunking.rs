//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations built on
//! the same recursive splitter:
//!
//! - [`MarkdownChunker`] — prefers heading, fence and rule boundaries before
//!   falling back to paragraphs, lines, words and characters
//! - [`RecursiveChunker`] — splits by paragraphs, lines, words, then characters
//!
//! Lengths are measured in characters, not bytes.

use std::collections::VecDeque;

use crate::document::{Chunk, Document};

/// Separators tried in order by [`MarkdownChunker`].
const MARKDOWN_SEPARATORS: &[&str] = &[
    "\n# ", "\n## ", "\n### ", "\n#### ", "\n##### ", "\n###### ", "```\n", "\n***\n", "\n---\n",
    "\n___\n", "\n\n", "\n", " ", "",
];

/// Separators tried in order by [`RecursiveChunker`].
const RECURSIVE_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no ids or
/// embeddings. Both are attached later by the ingestor.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has no non-whitespace text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Greedy recursive splitter with character overlap.
///
/// Text is cut at the first separator (from the configured list) that occurs
/// in it, keeping the separator at the start of the following piece. Pieces
/// shorter than `chunk_size` are merged greedily; when a chunk is emitted the
/// trailing pieces that total at most `chunk_overlap` characters are carried
/// into the next one. Pieces at or above `chunk_size` are split again with the
/// remaining separators. Emitted chunks are trimmed and empty ones dropped.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &'static [&'static str],
}

impl TextSplitter {
    pub fn new(
        chunk_size: usize,
        chunk_overlap: usize,
        separators: &'static [&'static str],
    ) -> Self {
        Self { chunk_size, chunk_overlap, separators }
    }

    /// Split `text` into trimmed, non-empty chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let index = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
            .unwrap_or(separators.len());
        let separator = separators.get(index).copied().unwrap_or("");
        let remaining = separators.get(index + 1..).unwrap_or(&[]);

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending));
                pending.clear();
            }
            if remaining.is_empty() {
                push_trimmed(&mut chunks, piece);
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }

        chunks
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                push_trimmed(&mut chunks, &window.iter().copied().collect::<String>());
                // Drop from the front until what is left fits as overlap.
                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            window.push_back(piece);
            total += len;
        }

        push_trimmed(&mut chunks, &window.iter().copied().collect::<String>());
        chunks
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn push_trimmed(chunks: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Split text at a separator, attaching each separator to the piece that follows it.
///
/// An empty separator splits into individual characters. Empty pieces are dropped.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (pos, _) in text.match_indices(separator) {
        if pos > start {
            pieces.push(&text[start..pos]);
            start = pos;
        }
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn chunks_from(document: &Document, texts: Vec<String>) -> Vec<Chunk> {
    texts
        .into_iter()
        .map(|text| Chunk {
            id: 0,
            text,
            metadata: document.metadata.clone(),
            embedding: Vec::new(),
        })
        .collect()
}

/// Splits markdown, preferring structural boundaries (headings, code fences,
/// horizontal rules) over paragraph and line breaks.
///
/// # Example
///
/// ```rust,ignore
/// use finsolve_rag::MarkdownChunker;
///
/// let chunker = MarkdownChunker::new(500, 20);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct MarkdownChunker {
    splitter: TextSplitter,
}

impl MarkdownChunker {
    /// Create a new `MarkdownChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { splitter: TextSplitter::new(chunk_size, chunk_overlap, MARKDOWN_SEPARATORS) }
    }
}

impl Chunker for MarkdownChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        chunks_from(document, self.splitter.split_text(&document.text))
    }
}

/// Splits plain text hierarchically: paragraphs → lines → words → characters.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    splitter: TextSplitter,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { splitter: TextSplitter::new(chunk_size, chunk_overlap, RECURSIVE_SEPARATORS) }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        chunks_from(document, self.splitter.split_text(&document.text))
    }
}
