//! Input discovery and record readers.
//!
//! Two layouts are accepted: JSON Lines with one document (and its nested
//! comments) per line, and a flat CSV with one comment per row. Rows that do
//! not deserialize are skipped and counted; I/O failures abort the batch.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{PipelineError, Result};
use crate::model::{CommentRecord, DocumentRecord};

const INPUT_EXTENSIONS: [&str; 3] = ["jsonl", "json", "csv"];

/// A flattened comment row, one per CSV line.
#[derive(Debug, Deserialize)]
struct CsvCommentRow {
    gallery_id: String,
    document_id: u64,
    title: String,
    document_author: String,
    comment_id: u64,
    author: String,
    contents: Option<String>,
    parent_id: Option<u64>,
    created_at: Option<DateTime<Utc>>,
}

/// Documents read from one file.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub documents: Vec<DocumentRecord>,
    pub skipped_records: usize,
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| INPUT_EXTENSIONS.contains(&ext))
}

/// Find all input files under `root`, sorted by path. A file root is
/// returned as-is.
pub fn discover_input_files(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            PipelineError::io(path, e.into())
        })?;
        if entry.file_type().is_file() && has_input_extension(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(PipelineError::NoInputFiles(root.to_path_buf()));
    }
    Ok(paths)
}

/// Read one document per non-blank line.
pub fn read_jsonl_documents(path: &Path) -> Result<ReadOutcome> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let mut outcome = ReadOutcome::default();

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| PipelineError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<DocumentRecord>(&line) {
            Ok(document) => outcome.documents.push(document),
            Err(source) => {
                let err = PipelineError::Json {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    source,
                };
                warn!("Skipping record: {}", err);
                outcome.skipped_records += 1;
            }
        }
    }

    debug!(path = ?path, documents = outcome.documents.len(), "read JSONL file");
    Ok(outcome)
}

/// Read flat comment rows and regroup them into documents, in first-seen
/// order. The first row of a document supplies its title and author.
pub fn read_csv_documents(path: &Path) -> Result<ReadOutcome> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let mut outcome = ReadOutcome::default();
    let mut index: HashMap<(String, u64), usize> = HashMap::new();

    for result in reader.deserialize::<CsvCommentRow>() {
        let row = match result {
            Ok(row) => row,
            Err(source) => {
                let err = PipelineError::Csv {
                    path: path.to_path_buf(),
                    source,
                };
                if !err.is_record_error() {
                    return Err(err);
                }
                warn!("Skipping record: {}", err);
                outcome.skipped_records += 1;
                continue;
            }
        };

        let slot = *index
            .entry((row.gallery_id.clone(), row.document_id))
            .or_insert_with(|| {
                outcome.documents.push(DocumentRecord {
                    gallery_id: row.gallery_id.clone(),
                    document_id: row.document_id,
                    title: row.title.clone(),
                    author: row.document_author.clone().into(),
                    comments: Some(Vec::new()),
                });
                outcome.documents.len() - 1
            });

        outcome.documents[slot]
            .comments
            .get_or_insert_with(Vec::new)
            .push(CommentRecord {
                id: row.comment_id,
                author: row.author.into(),
                contents: row.contents,
                parent_id: row.parent_id,
                created_at: row.created_at,
            });
    }

    debug!(path = ?path, documents = outcome.documents.len(), "read CSV file");
    Ok(outcome)
}

/// Dispatch on file extension.
pub fn read_documents(path: &Path) -> Result<ReadOutcome> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => read_csv_documents(path),
        _ => read_jsonl_documents(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Author;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_discover_input_files() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("sub")).unwrap();
        std::fs::write(temp.path().join("b.jsonl"), "").unwrap();
        std::fs::write(temp.path().join("sub/a.csv"), "").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "").unwrap();

        let files = discover_input_files(temp.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("b.jsonl"));
        assert!(files[1].ends_with("sub/a.csv"));
    }

    #[test]
    fn test_discover_empty_root() {
        let temp = TempDir::new().unwrap();
        let err = discover_input_files(temp.path()).unwrap_err();
        assert!(matches!(err, PipelineError::NoInputFiles(_)));
    }

    #[test]
    fn test_jsonl_skips_malformed_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docs.jsonl");
        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{"gallery_id":"g","id":1,"title":"t","author":"a","comments":[]}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{{not json").unwrap();
        writeln!(file, r#"{{"gallery_id":"g","id":2,"title":"t2","author":"b"}}"#).unwrap();

        let outcome = read_documents(&path).unwrap();
        assert_eq!(outcome.documents.len(), 2);
        assert_eq!(outcome.skipped_records, 1);
        assert_eq!(outcome.documents[1].document_id, 2);
    }

    #[test]
    fn test_csv_regroups_rows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("comments.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            "gallery_id,document_id,title,document_author,comment_id,author,contents,parent_id,created_at"
        )
        .unwrap();
        writeln!(file, "g,1,Title,op,10,a,hello,,2021-01-01T00:00:00Z").unwrap();
        writeln!(file, "g,2,Other,op2,20,b,yo,,").unwrap();
        writeln!(file, "g,1,Title,op,11,b,\"hi, a\",10,2021-01-01T00:01:00Z").unwrap();
        writeln!(file, "g,oops,Title,op,12,b,bad,,").unwrap();
        writeln!(file, "g,1,Title,op,13,c,,10,").unwrap();

        let outcome = read_documents(&path).unwrap();
        assert_eq!(outcome.skipped_records, 1);
        assert_eq!(outcome.documents.len(), 2);

        let first = &outcome.documents[0];
        assert_eq!(first.document_id, 1);
        assert_eq!(first.author, Author::from("op"));
        let comments = first.comments();
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[1].contents.as_deref(), Some("hi, a"));
        assert_eq!(comments[1].parent_id, Some(10));
        assert_eq!(comments[0].parent_id, None);
        assert_eq!(comments[2].contents, None);
        assert!(comments[2].created_at.is_none());
    }
}
