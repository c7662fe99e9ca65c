// src/commands/rewrite.rs
//! Rewrite command

use super::{current_package, print_report};
use anyhow::{Context, Result};
use hashvend::config::VendorConfig;
use hashvend::mapping::{build_rewrite_map, FixTranslator};
use hashvend::rewrite::{RewriteEngine, RewriteOptions};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::info;

/// Arguments of `hashvend rewrite`
pub struct RewriteArgs {
    pub names: Vec<String>,
    pub undo: bool,
    pub dry_run: bool,
    pub pkgdir: Option<PathBuf>,
    pub fix: bool,
    pub strip_import_comments: bool,
}

/// Rewrite the current package's imports, forward or back
pub fn cmd_rewrite(args: RewriteArgs) -> Result<()> {
    let config = VendorConfig::from_env()?;
    let (root, pkg) = current_package()?;
    let engine = RewriteEngine::new(config.workers).with_options(RewriteOptions {
        strip_import_comments: args.strip_import_comments,
    });

    if args.fix {
        let translate = FixTranslator::new(&config);
        let report = engine.rewrite_tree(&root, &translate, |_| true)?;
        print_report(&report);
        return Ok(());
    }

    let vendor_dir = args
        .pkgdir
        .unwrap_or_else(|| config.vendor_dir_of(&root));

    info!("Building rewrite mapping");
    let mut map = build_rewrite_map(&pkg, &vendor_dir, &config, args.undo)
        .context("Build of rewrite mapping failed")?;
    if !args.names.is_empty() {
        let names: BTreeSet<String> = args.names.into_iter().collect();
        map.retain_names(&names, args.undo);
    }
    info!("Rewrite mapping complete: {} entries", map.len());

    if args.dry_run {
        map.write_table(&mut std::io::stdout().lock())?;
        return Ok(());
    }

    let translate = map.into_mapper();
    let report = engine.rewrite_tree(&root, &translate, |_| true)?;
    print_report(&report);
    Ok(())
}
