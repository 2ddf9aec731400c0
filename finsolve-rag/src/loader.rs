//! Reads per-department document sets from disk and splits them into chunks.
//!
//! Layout under the data directory:
//!
//! ```text
//! data/
//!   engineering/*.md
//!   finance/*.md
//!   general/*.md
//!   marketing/*.md
//!   hr/*.md
//!   hr/hr_data.csv
//! ```

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::chunking::{Chunker, MarkdownChunker, RecursiveChunker};
use crate::config::RagConfig;
use crate::department::Department;
use crate::document::{Chunk, ChunkMetadata, Document};
use crate::error::{RagError, Result};

/// File name of the HR employee table inside the `hr` directory.
pub const HR_TABLE_FILE: &str = "hr_data.csv";

/// Loads markdown documents for every department plus the HR table.
///
/// Reading is side-effect free. A missing department directory (or a missing
/// HR table) contributes zero chunks; unreadable files and a malformed table
/// are [`RagError::IngestError`]s.
pub struct DocumentLoader {
    data_dir: PathBuf,
    markdown: MarkdownChunker,
    table: RecursiveChunker,
}

impl DocumentLoader {
    pub fn new(data_dir: impl Into<PathBuf>, config: &RagConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            markdown: MarkdownChunker::new(config.chunk_size, config.chunk_overlap),
            table: RecursiveChunker::new(config.chunk_size, config.chunk_overlap),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Chunk every department's markdown (in [`Department::ALL`] order), then the HR table.
    pub fn load_all(&self) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        for department in Department::ALL {
            chunks.extend(self.load_markdown(department)?);
        }
        chunks.extend(self.load_hr_table()?);
        Ok(chunks)
    }

    /// Chunk the markdown documents of one department, in file-name order.
    pub fn load_markdown(&self, department: Department) -> Result<Vec<Chunk>> {
        let documents = self.read_markdown(department)?;
        let chunks: Vec<Chunk> = documents.iter().flat_map(|d| self.markdown.chunk(d)).collect();
        debug!(%department, documents = documents.len(), chunk_count = chunks.len(), "loaded markdown");
        Ok(chunks)
    }

    /// Chunk the HR table, one rendered row at a time.
    pub fn load_hr_table(&self) -> Result<Vec<Chunk>> {
        let path = self.data_dir.join(Department::Hr.as_str()).join(HR_TABLE_FILE);
        let rows = match fs::read_to_string(&path) {
            Ok(content) => render_rows(&content, &path)?,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                warn!(path = %path.display(), "HR table not found, skipping");
                return Ok(Vec::new());
            }
            Err(e) => return Err(RagError::ingest(path.display().to_string(), e.to_string())),
        };

        let chunks: Vec<Chunk> = rows
            .into_iter()
            .map(|text| Document { text, metadata: ChunkMetadata::new(Department::Hr, HR_TABLE_FILE) })
            .flat_map(|d| self.table.chunk(&d))
            .collect();
        debug!(chunk_count = chunks.len(), "loaded HR table");
        Ok(chunks)
    }

    fn read_markdown(&self, department: Department) -> Result<Vec<Document>> {
        let dir = self.data_dir.join(department.as_str());
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                warn!(%department, dir = %dir.display(), "department directory missing, skipping");
                return Ok(Vec::new());
            }
            Err(e) => return Err(RagError::ingest(dir.display().to_string(), e.to_string())),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| RagError::ingest(dir.display().to_string(), e.to_string()))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                paths.push(path);
            }
        }
        paths.sort();

        paths
            .into_iter()
            .map(|path| {
                let text = fs::read_to_string(&path)
                    .map_err(|e| RagError::ingest(path.display().to_string(), e.to_string()))?;
                let source = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                Ok(Document { text, metadata: ChunkMetadata::new(department, source) })
            })
            .collect()
    }
}

/// Render each table row as newline-separated `column: value` lines.
fn render_rows(content: &str, path: &Path) -> Result<Vec<String>> {
    let origin = || path.display().to_string();
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| RagError::ingest(origin(), format!("invalid header row: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| RagError::ingest(origin(), format!("malformed row: {e}")))?;
        let lines: Vec<String> = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| format!("{column}: {}", value.trim()))
            .collect();
        rows.push(lines.join("\n"));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn renders_rows_as_column_value_blocks() {
        let rows = render_rows("name,salary\nAadhya,1200.50\nRavi,900\n", Path::new("t.csv")).unwrap();
        assert_eq!(rows, vec!["name: Aadhya\nsalary: 1200.50", "name: Ravi\nsalary: 900"]);
    }

    #[test]
    fn ragged_row_is_an_ingest_error() {
        let err = render_rows("a,b\n1,2,3\n", Path::new("t.csv")).unwrap_err();
        assert!(matches!(err, RagError::IngestError { .. }));
    }

    #[test]
    fn missing_directories_yield_no_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DocumentLoader::new(dir.path(), &RagConfig::default());
        assert!(loader.load_all().unwrap().is_empty());
    }

    #[test]
    fn reads_only_markdown_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "finance/b_report.md", "Second report.");
        write(dir.path(), "finance/a_summary.md", "First summary.");
        write(dir.path(), "finance/notes.txt", "ignored");

        let loader = DocumentLoader::new(dir.path(), &RagConfig::default());
        let chunks = loader.load_markdown(Department::Finance).unwrap();

        let sources: Vec<&str> = chunks.iter().map(|c| c.metadata.source.as_str()).collect();
        assert_eq!(sources, vec!["a_summary.md", "b_report.md"]);
        assert!(chunks.iter().all(|c| c.metadata.department == Department::Finance));
    }

    #[test]
    fn table_rows_are_tagged_as_hr() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "hr/hr_data.csv", "employee_id,department\nE1,Sales\n");

        let loader = DocumentLoader::new(dir.path(), &RagConfig::default());
        let chunks = loader.load_hr_table().unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "employee_id: E1\ndepartment: Sales");
        assert_eq!(chunks[0].metadata, ChunkMetadata::new(Department::Hr, HR_TABLE_FILE));
    }

    #[test]
    fn markdown_precedes_the_table_in_load_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "hr/hr_data.csv", "id\n1\n");
        write(dir.path(), "hr/policy.md", "Leave policy.");
        write(dir.path(), "general/handbook.md", "Handbook.");

        let loader = DocumentLoader::new(dir.path(), &RagConfig::default());
        let sources: Vec<String> =
            loader.load_all().unwrap().into_iter().map(|c| c.metadata.source).collect();
        assert_eq!(sources, vec!["handbook.md", "policy.md", HR_TABLE_FILE]);
    }

    #[test]
    fn wide_hr_row_is_split_with_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let notes: Vec<String> = (1..=120).map(|i| format!("note{i:03}")).collect();
        write(dir.path(), "hr/hr_data.csv", &format!("employee_id,full_name,notes\nFINEMP1001,Wide Row,{}\n", notes.join(" ")));

        let loader = DocumentLoader::new(dir.path(), &RagConfig::default());
        let chunks = loader.load_hr_table().unwrap();

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 500));
        assert!(chunks.iter().all(|c| c.metadata == ChunkMetadata::new(Department::Hr, HR_TABLE_FILE)));
        assert_eq!(chunks[0].text, "employee_id: FINEMP1001\nfull_name: Wide Row");
        assert!(chunks[1].text.starts_with("notes: note001"));
        assert!(chunks[1].text.ends_with("note060 note061"));
        assert!(chunks[2].text.starts_with("note060 note061 note062"));
        assert!(chunks[2].text.ends_with("note120"));
    }
}
