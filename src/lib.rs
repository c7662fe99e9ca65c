// src/lib.rs

//! hashvend: vendoring Go dependencies into a content-addressed store
//!
//! Given a Go package, hashvend discovers the external repositories it
//! imports, publishes each of them (dependencies first) into a package
//! store that addresses trees by content hash, and rewrites import
//! declarations so sources import their dependencies by vendored path
//! (`gx/ipfs/<hash>/<name>`). The rewrite can be reversed.
//!
//! # Architecture
//!
//! - `rewrite`: syntax-aware, minimal-diff import rewriting of single files
//!   and of whole trees on a worker pool
//! - `mapping`: rewrite maps built from the published dependency graph
//! - `importer`: the bottom-up publish of an import path's dependency graph
//! - `oracle` / `store`: seams to the Go toolchain and the package store

pub mod config;
pub mod descriptor;
mod error;
pub mod hash;
pub mod importer;
pub mod importpath;
pub mod mapping;
pub mod oracle;
pub mod prompt;
pub mod rewrite;
pub mod store;

pub use config::VendorConfig;
pub use descriptor::{Dependency, GoInfo, Package};
pub use error::{Error, Result};
pub use hash::ContentHash;
pub use importer::{ImportOptions, Importer};
pub use mapping::{build_dep_map, build_rewrite_map, DepMap, RewriteMap};
pub use rewrite::{rewrite_file, RewriteEngine, RewriteOptions, RewriteReport, Translate};
