// src/commands/dep_map.rs
//! Dep-map command

use super::current_package;
use anyhow::Result;
use hashvend::config::VendorConfig;
use hashvend::mapping::build_dep_map;

/// Print the origin import path -> hash map of the current package as JSON
pub fn cmd_dep_map() -> Result<()> {
    let config = VendorConfig::from_env()?;
    let (root, pkg) = current_package()?;

    let map = build_dep_map(&pkg, &config.vendor_dir_of(&root), &config)?;
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}
