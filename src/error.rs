// src/error.rs

//! Error types for hashvend
//!
//! Lower-level components return these instead of terminating; the binary
//! decides what is fatal to the overall run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while resolving, rewriting, or publishing packages
#[derive(Error, Debug)]
pub enum Error {
    /// Nothing can proceed (no workspace root, no package root, missing tool)
    #[error("configuration error: {0}")]
    Config(String),

    /// A declared dependency could not be found locally or in the global cache
    #[error("package {name:?} not found (dependency of {parent})")]
    DependencyNotFound { name: String, parent: String },

    /// Several packages claim the same import path
    #[error("multiple conflicting packages found at {0}")]
    AmbiguousPackage(String),

    /// Import path could not be located by the path oracle
    #[error("import path not found: {0}")]
    NotFound(String),

    /// A source file's import section could not be parsed
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Publishing re-entered an import path that was still being published
    #[error("cyclic dependency involving {}", chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    /// Publishing an import path failed; carries the offending path
    #[error("failed to import {import_path}: {source}")]
    Publish {
        import_path: String,
        #[source]
        source: Box<Error>,
    },

    /// An external command (go, gx, ipfs) failed
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    /// Malformed content hash
    #[error("invalid content hash: {0}")]
    InvalidHash(String),

    /// I/O failure with the path it happened on
    #[error("I/O error on {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bare I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Package descriptor or dep-map (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Directory walk failure
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for a source file
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wrap this error with the import path being published
    ///
    /// Errors that already name an import path are returned untouched so a
    /// failure deep in the graph is reported once, at its origin.
    pub fn in_import(self, import_path: &str) -> Self {
        match self {
            err @ (Self::Publish { .. } | Self::CyclicDependency { .. }) => err,
            other => Self::Publish {
                import_path: import_path.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// True if this is a "not found" style I/O failure
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Io(e) | Self::IoError { source: e, .. } => {
                e.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}
