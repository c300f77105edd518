//! Error types for the episode pipeline.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON record at {path:?}:{line}: {source}")]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed CSV record in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("no input files (.jsonl, .json, .csv) found under {0:?}")]
    NoInputFiles(PathBuf),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error concerns a single record rather than the batch.
    pub fn is_record_error(&self) -> bool {
        match self {
            Self::Json { .. } => true,
            Self::Csv { source, .. } => !source.is_io_error(),
            Self::Io { .. } | Self::NoInputFiles(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
