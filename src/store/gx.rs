// src/store/gx.rs

//! `PackageStore` backed by the `gx` and `ipfs` commands

use super::PackageStore;
use crate::descriptor::Package;
use crate::error::{Error, Result};
use crate::hash::ContentHash;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info};

/// Publishes with `gx publish` and fetches with `ipfs get`
pub struct GxStore {
    gx: PathBuf,
    ipfs: PathBuf,
}

impl GxStore {
    /// Locate `gx` and `ipfs` on `PATH`
    pub fn new() -> Result<Self> {
        let gx = which::which("gx")
            .map_err(|e| Error::Config(format!("gx command not found: {}", e)))?;
        let ipfs = which::which("ipfs")
            .map_err(|e| Error::Config(format!("ipfs command not found: {}", e)))?;
        Ok(Self::with_binaries(gx, ipfs))
    }

    pub fn with_binaries(gx: impl Into<PathBuf>, ipfs: impl Into<PathBuf>) -> Self {
        Self {
            gx: gx.into(),
            ipfs: ipfs.into(),
        }
    }
}

fn run(tool: &Path, mut cmd: Command) -> Result<Output> {
    let output = cmd.output().map_err(|e| Error::Tool {
        tool: tool.display().to_string(),
        message: format!("failed to run: {}", e),
    })?;
    if !output.status.success() {
        return Err(Error::Tool {
            tool: tool.display().to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

/// Find the hash in `gx publish` output
///
/// The tool reports `package <name> published with hash: <hash>`.
fn parse_published_hash(stdout: &str) -> Result<ContentHash> {
    stdout
        .lines()
        .filter(|line| line.contains("published"))
        .filter_map(|line| line.split_whitespace().last())
        .last()
        .ok_or_else(|| Error::Tool {
            tool: "gx".to_string(),
            message: format!("no hash in publish output: {}", stdout.trim()),
        })
        .and_then(ContentHash::new)
}

impl PackageStore for GxStore {
    fn publish(&self, dir: &Path, pkg: &Package) -> Result<ContentHash> {
        debug!("gx publish in {}", dir.display());
        let mut cmd = Command::new(&self.gx);
        cmd.arg("publish").current_dir(dir);
        let output = run(&self.gx, cmd)?;

        let hash = parse_published_hash(&String::from_utf8_lossy(&output.stdout))?;
        info!("Published {} as {}", pkg.name, hash);
        Ok(hash)
    }

    fn fetch(&self, hash: &ContentHash, dest: &Path) -> Result<()> {
        debug!("ipfs get {} -> {}", hash, dest.display());
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let mut cmd = Command::new(&self.ipfs);
        cmd.arg("get").arg(hash.as_str()).arg("-o").arg(dest);
        run(&self.ipfs, cmd)?;
        Ok(())
    }
}
