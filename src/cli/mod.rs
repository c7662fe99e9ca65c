// src/cli/mod.rs
//! CLI definitions for hashvend
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hashvend")]
#[command(author = "hashvend contributors")]
#[command(version)]
#[command(about = "Vendor Go dependencies into a content-addressed package store", long_about = None)]
pub struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish a Go package and all of its dependencies
    Import {
        /// Import path to publish
        path: String,

        /// Rewrite each package's imports to vendored paths before publishing
        #[arg(long)]
        rewrite: bool,

        /// Accept default package names without prompting
        #[arg(long)]
        yesall: bool,

        /// JSON document mapping import paths to already published hashes
        #[arg(long, value_name = "FILE")]
        map: Option<PathBuf>,

        /// Use a fresh temporary directory as the Go workspace
        #[arg(long)]
        tmpdir: bool,
    },

    /// Rewrite the current package's imports to vendored paths
    #[command(visible_alias = "rw")]
    Rewrite {
        /// Only rewrite dependencies with these package names
        names: Vec<String>,

        /// Rewrite vendored paths back to their origin import paths
        #[arg(long)]
        undo: bool,

        /// Print the rewrite map without touching any files
        #[arg(long)]
        dry_run: bool,

        /// Alternative location of the vendored dependency directory
        #[arg(long, value_name = "DIR")]
        pkgdir: Option<PathBuf>,

        /// Error-tolerant undo using descriptors in the global cache
        #[arg(long, conflicts_with_all = ["names", "dry_run", "undo"])]
        fix: bool,

        /// Remove `// import "..."` comments from rewritten files
        #[arg(long)]
        strip_import_comments: bool,
    },

    /// Print a JSON map of origin import paths to hashes for `import --map`
    DepMap,

    /// Replace one import path with another throughout the current tree
    Update {
        /// Import path to replace
        old: String,

        /// Replacement import path
        new: String,
    },

    /// Print the origin import path of the current package
    Path,

    /// List the external repositories the current package imports
    DvcsDeps,
}
