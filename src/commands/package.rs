// src/commands/package.rs
//! Commands describing the current package

use super::current_package;
use anyhow::{anyhow, Result};
use hashvend::config::VendorConfig;
use hashvend::importer::deps_to_vendor;
use hashvend::oracle::GoTool;

/// Print the origin import path of the current package
pub fn cmd_path() -> Result<()> {
    let (_, pkg) = current_package()?;
    let origin = pkg
        .origin_import()
        .ok_or_else(|| anyhow!("package {} has no origin import path", pkg.name))?;
    println!("{}", origin);
    Ok(())
}

/// List the external repositories the current package imports
pub fn cmd_dvcs_deps() -> Result<()> {
    let config = VendorConfig::from_env()?;
    let (root, pkg) = current_package()?;
    let import_path = match pkg.origin_import() {
        Some(origin) => origin.to_string(),
        None => config.import_path_of(&root)?,
    };

    let oracle = GoTool::new(config.gopath.clone())?;
    for dep in deps_to_vendor(&oracle, &import_path, &root, config.canonical_depth)? {
        println!("{}", dep);
    }
    Ok(())
}
