// src/oracle/mod.rs

//! Source materialization and import enumeration
//!
//! The importer never reads Go build metadata itself. It asks a
//! `PathOracle` to fetch an import path's source into the workspace and to
//! list the imports of a package directory.

mod gotool;

pub use gotool::GoTool;

use crate::error::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// How a lookup of an import path went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportClass {
    /// A single buildable package
    Ok,
    /// The directory exists but holds no buildable source files
    NoSourceFiles,
    /// Several packages (different package clauses) share the directory
    Ambiguous,
    /// Anything else, with the tool's message
    Other(String),
}

impl ImportClass {
    /// Classify a build tool error message
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("no go files") || lower.contains("no buildable go source files") {
            Self::NoSourceFiles
        } else if lower.contains("found packages") {
            Self::Ambiguous
        } else {
            Self::Other(message.trim().to_string())
        }
    }
}

/// Result of materializing an import path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Local directory holding the source
    pub dir: PathBuf,
    pub class: ImportClass,
}

/// Direct imports of one package directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectImports {
    /// Imports of both regular and test files
    pub imports: BTreeSet<String>,
    pub class: ImportClass,
}

/// Answers questions about import paths
pub trait PathOracle: Send + Sync {
    /// Make the source of `import_path` available locally
    ///
    /// Fails with `Error::NotFound` when the path cannot be located at all.
    fn resolve(&self, import_path: &str) -> Result<Resolved>;

    /// List the direct imports of the package at `import_path`
    fn direct_imports(&self, import_path: &str) -> Result<DirectImports>;
}
