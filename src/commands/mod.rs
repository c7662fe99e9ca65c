// src/commands/mod.rs
//! Command handlers for the hashvend CLI

mod dep_map;
mod import;
mod package;
mod rewrite;
mod update;

pub use dep_map::cmd_dep_map;
pub use import::cmd_import;
pub use package::{cmd_dvcs_deps, cmd_path};
pub use rewrite::{cmd_rewrite, RewriteArgs};
pub use update::cmd_update;

use anyhow::{Context, Result};
use hashvend::descriptor::{find_package_root, Package, PKG_FILE_NAME};
use hashvend::rewrite::RewriteReport;
use std::path::PathBuf;

/// Root directory and descriptor of the package containing the working
/// directory
fn current_package() -> Result<(PathBuf, Package)> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let root = find_package_root(&cwd)?;
    let pkg = Package::load(&root.join(PKG_FILE_NAME))
        .with_context(|| format!("Failed to load package file in {}", root.display()))?;
    Ok((root, pkg))
}

/// Summarize a tree rewrite for the user
fn print_report(report: &RewriteReport) {
    println!(
        "Rewrote {} file(s), {} unchanged, {} failed",
        report.rewritten.len(),
        report.unchanged,
        report.failures.len()
    );
}
