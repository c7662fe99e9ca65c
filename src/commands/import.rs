// src/commands/import.rs
//! Import command

use anyhow::{Context, Result};
use hashvend::config::VendorConfig;
use hashvend::importer::{ImportOptions, Importer};
use hashvend::mapping::load_dep_map;
use hashvend::oracle::GoTool;
use hashvend::prompt::LinePrompt;
use hashvend::store::GxStore;
use std::path::PathBuf;
use tracing::info;

/// Publish an import path and its dependency graph
pub fn cmd_import(
    path: &str,
    rewrite: bool,
    yes_all: bool,
    map: Option<PathBuf>,
    tmpdir: bool,
) -> Result<()> {
    let overrides = match map {
        Some(file) => load_dep_map(&file)
            .with_context(|| format!("Failed to load dep map {}", file.display()))?,
        None => Default::default(),
    };

    let config = if tmpdir {
        let dir = tempfile::Builder::new()
            .prefix("hashvend-import")
            .tempdir()
            .context("Failed to create temporary workspace")?
            .keep();
        info!("Using {} as the Go workspace", dir.display());
        let base = VendorConfig::from_env().unwrap_or_else(|_| VendorConfig::new(&dir));
        VendorConfig { gopath: dir, ..base }
    } else {
        VendorConfig::from_env().context("Could not determine the Go workspace")?
    };

    let oracle = GoTool::new(config.gopath.clone())?;
    let store = GxStore::new()?;
    let options = ImportOptions {
        rewrite,
        yes_all,
        overrides,
        ..Default::default()
    };

    info!("Vendoring package {}", path);
    let mut importer = Importer::new(oracle, store, LinePrompt::stdio(), config).with_options(options);
    let dep = importer.publish(path)?;

    println!("{} {}", dep.hash, dep.name);
    Ok(())
}
