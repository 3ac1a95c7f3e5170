//! Error types for tabedit-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons raw text could not be turned into a table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was empty or the header record had no fields
    #[error("input is empty or has no header fields")]
    EmptyInput,

    /// The header names the same column twice
    #[error("duplicate header column '{0}'")]
    DuplicateHeader(String),

    /// A record has more fields than the header
    #[error("record on line {line} has {actual} fields, expected at most {expected}")]
    MalformedRow {
        line: usize,
        expected: usize,
        actual: usize,
    },

    /// Input ended inside a quoted field
    #[error("quoted field starting on line {line} is never closed")]
    UnterminatedQuote { line: usize },
}

/// Reasons an edit operation was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("row {row} is out of range (table has {len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("cannot remove the last remaining column")]
    LastColumn,
}

/// Errors that can occur in tabedit-core
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("edit rejected: {0}")]
    Edit(#[from] EditError),

    /// An edit script operation failed; nothing from the script was applied
    #[error("edit #{index} in script failed: {source}")]
    Script {
        index: usize,
        #[source]
        source: EditError,
    },

    /// Input bytes were not valid UTF-8
    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Dialect settings that cannot round-trip
    #[error("invalid dialect: {0}")]
    InvalidDialect(String),

    /// A session operation needs a table but none is loaded
    #[error("no table loaded")]
    NoTableLoaded,

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
