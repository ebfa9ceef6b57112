//! Error types for the JT library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for JT operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid magic bytes at start of file
    #[error("Invalid JT file: expected \"Version\" header string")]
    InvalidMagic,

    /// Read past the declared end of a byte or bit source
    #[error("Read of {requested} past end of data (position {position}, length {length})")]
    OutOfRange {
        requested: usize,
        position: usize,
        length: usize,
    },

    /// Unknown object-type GUID or segment type encountered while parsing
    #[error("Unsupported format construct: {0}")]
    UnsupportedFormat(String),

    /// Recognized but unimplemented format variant
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// Attribute value of a type the format cannot carry
    #[error("Invalid property value: {0}")]
    InvalidPropertyValue(String),

    /// Invalid data structure in file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create an unsupported-format error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }
}

/// Result type alias for JT operations.
pub type Result<T> = std::result::Result<T, Error>;
