//! Error types for SyneryDB
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::codec::FieldType;

/// Result type alias using SyneryError
pub type Result<T> = std::result::Result<T, SyneryError>;

/// Unified error type for SyneryDB operations
#[derive(Debug, Error)]
pub enum SyneryError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error on shard '{}': {source}", path.display())]
    ShardIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    #[error("Malformed varint: more than {max_bits} bits")]
    MalformedVarint { max_bits: u32 },

    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Unsupported type '{0}'")]
    UnsupportedType(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error(
        "Corrupt data in '{}' at row {row}, field '{field}' ({field_type}): {source}",
        path.display()
    )]
    CorruptData {
        path: PathBuf,
        row: usize,
        field: String,
        field_type: FieldType,
        #[source]
        source: Box<SyneryError>,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    // -------------------------------------------------------------------------
    // Table Errors
    // -------------------------------------------------------------------------
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Table '{0}' already exists")]
    TableExists(String),

    // -------------------------------------------------------------------------
    // Instance Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database is locked by marker file '{}'", .0.display())]
    LockHeld(PathBuf),

    #[error("Database has been disposed")]
    Disposed,
}

impl SyneryError {
    /// Attach a shard path to an I/O error
    pub(crate) fn shard_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyneryError::ShardIo {
            path: path.into(),
            source,
        }
    }
}
