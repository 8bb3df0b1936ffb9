//! Error types for filesystem-tree

use std::path::PathBuf;

/// Result type for filesystem-tree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or tearing down a tree
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Item {index} is not a directory marker or file spec: {reason}")]
    InvalidItem { index: usize, reason: String },

    #[error("File spec at item {index} has {len} fields; expected 2, 3 or 4")]
    InvalidFileSpec { index: usize, len: usize },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown text encoding: {label}")]
    UnknownEncoding { label: String },

    #[error("Content for {path} cannot be encoded as {encoding}")]
    Unencodable { path: PathBuf, encoding: String },

    #[error("Failed to parse {format} manifest at {path}: {message}")]
    ManifestParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported manifest format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error rejects the shape of a tree definition item.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidItem { .. } | Self::InvalidFileSpec { .. })
    }
}
