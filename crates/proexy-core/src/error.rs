use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProexyError {
    #[error("cannot open document: {0}")]
    DocumentOpen(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("no table found on page {page} (tried grid and positional detection)")]
    TableNotFound { page: usize },

    #[error("no header row containing {tokens:?} could be detected")]
    HeaderNotDetected { tokens: Vec<String> },

    #[error("table has only {found} columns (expected {expected})")]
    InsufficientColumns { found: usize, expected: usize },

    #[error("setup failed for {path}: {reason}")]
    Setup { path: PathBuf, reason: String },

    #[error("failed to write spreadsheet: {0}")]
    Serialization(String),

    #[error("failed to load config from {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProexyError {
    /// Short machine-friendly label used in run summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            ProexyError::DocumentOpen(_)
            | ProexyError::PdftotextNotFound
            | ProexyError::PdftotextFailed { .. } => "document_open",
            ProexyError::TableNotFound { .. } => "table_not_found",
            ProexyError::HeaderNotDetected { .. } => "header_not_detected",
            ProexyError::InsufficientColumns { .. } => "insufficient_columns",
            ProexyError::Setup { .. } => "setup",
            ProexyError::Serialization(_) => "serialization",
            ProexyError::Config { .. } => "config",
            ProexyError::Io(_) => "io",
            ProexyError::Json(_) => "json",
        }
    }
}
