// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Import {
            path,
            rewrite,
            yesall,
            map,
            tmpdir,
        } => commands::cmd_import(&path, rewrite, yesall, map, tmpdir),
        Commands::Rewrite {
            names,
            undo,
            dry_run,
            pkgdir,
            fix,
            strip_import_comments,
        } => commands::cmd_rewrite(commands::RewriteArgs {
            names,
            undo,
            dry_run,
            pkgdir,
            fix,
            strip_import_comments,
        }),
        Commands::DepMap => commands::cmd_dep_map(),
        Commands::Update { old, new } => commands::cmd_update(&old, &new),
        Commands::Path => commands::cmd_path(),
        Commands::DvcsDeps => commands::cmd_dvcs_deps(),
    }
}
