// src/store/mod.rs

//! Content-addressed package store
//!
//! Publishing hands a package directory to the store and gets back the
//! identifier of the stored tree. The same identifier fetches the tree
//! back later.

mod gx;

pub use gx::GxStore;

use crate::descriptor::Package;
use crate::error::Result;
use crate::hash::ContentHash;
use std::path::Path;

/// A store of immutable package trees
pub trait PackageStore: Send + Sync {
    /// Store the tree at `dir`, whose descriptor is `pkg`
    fn publish(&self, dir: &Path, pkg: &Package) -> Result<ContentHash>;

    /// Materialize a stored tree at `dest`
    fn fetch(&self, hash: &ContentHash, dest: &Path) -> Result<()>;

    /// Read the descriptor of a fetched tree
    fn find_descriptor(&self, dir: &Path) -> Result<Package> {
        Package::find_in_dir(dir)
    }
}
