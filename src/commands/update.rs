// src/commands/update.rs
//! Update command

use super::print_report;
use anyhow::{Context, Result};
use hashvend::config::VendorConfig;
use hashvend::rewrite::{Rename, RewriteEngine};

/// Replace one import path with another in the working directory tree
pub fn cmd_update(old: &str, new: &str) -> Result<()> {
    let config = VendorConfig::from_env()?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let report = RewriteEngine::new(config.workers).rewrite_tree(
        &cwd,
        &Rename::new(old, new),
        |_| true,
    )?;
    print_report(&report);
    Ok(())
}
