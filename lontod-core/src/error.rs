//! Error types for indexing, storage and negotiation.

use std::path::PathBuf;

use thiserror::Error;

use crate::format::Format;

/// The RDF toolkit rejected the input bytes.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Syntax error reported by a parser.
    #[error("invalid {format} syntax: {message}")]
    Syntax { format: Format, message: String },

    /// The format is recognised but cannot be read.
    #[error("reading {0} is not supported")]
    Unsupported(Format),
}

/// A single output format could not be produced.
#[derive(Debug, Error)]
#[error("failed to serialize as {format}: {message}")]
pub struct SerializeError {
    pub format: Format,
    pub message: String,
}

impl SerializeError {
    pub fn new(format: Format, message: impl ToString) -> Self {
        Self {
            format,
            message: message.to_string(),
        }
    }
}

/// HTML generation failed.
#[derive(Debug, Error)]
#[error("failed to render html: {0}")]
pub struct RenderError(pub String);

/// Errors from the index store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A schema migration failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Invalid data in the database.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A previous writer panicked while holding the connection.
    #[error("database connection poisoned")]
    Poisoned,
}

/// Why indexing a single file failed.
///
/// Every variant leaves the previously committed state for the file untouched.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("{path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    /// Not a single machine-readable serialization could be produced.
    #[error("{path}: no machine-readable serialization could be produced")]
    NoSerialization { path: PathBuf },

    #[error("{path}: unrecognised file extension")]
    UnknownExtension { path: PathBuf },

    #[error("{path}: neither a file nor a directory")]
    NotFound { path: PathBuf },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
}

impl IndexError {
    /// The path of the file that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            IndexError::Parse { path, .. }
            | IndexError::Render { path, .. }
            | IndexError::NoSerialization { path }
            | IndexError::UnknownExtension { path }
            | IndexError::NotFound { path }
            | IndexError::Io { path, .. }
            | IndexError::Store { path, .. } => path,
        }
    }
}

/// No available representation satisfies the client's preferences.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("none of the available media types are acceptable")]
pub struct NotAcceptable;
