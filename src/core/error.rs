use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Per-file failures. None of these abort a run; each becomes a [`Diagnostic`].
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported language '{language}' for {path}")]
    UnsupportedLanguage { path: PathBuf, language: String },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ScanError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            ScanError::Parse { .. } => DiagnosticKind::ParseError,
            ScanError::UnsupportedLanguage { .. } => DiagnosticKind::UnsupportedLanguage,
            ScanError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                DiagnosticKind::NotFound
            }
            ScanError::Io { .. } => DiagnosticKind::IoError,
        }
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            ScanError::Parse { path, .. }
            | ScanError::UnsupportedLanguage { path, .. }
            | ScanError::Io { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    ParseError,
    UnsupportedLanguage,
    NotFound,
    IoError,
    /// A raw record the normalizer had to drop (e.g. an empty name).
    Dropped,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticKind::ParseError => "parse_error",
            DiagnosticKind::UnsupportedLanguage => "unsupported_language",
            DiagnosticKind::NotFound => "not_found",
            DiagnosticKind::IoError => "io_error",
            DiagnosticKind::Dropped => "dropped",
        };
        f.write_str(label)
    }
}

/// Side-channel record of a non-fatal problem encountered during a run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl From<&ScanError> for Diagnostic {
    fn from(err: &ScanError) -> Self {
        Self {
            file: err.path().clone(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
