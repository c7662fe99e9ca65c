// src/config.rs

//! Runtime configuration
//!
//! There is no config file: everything comes from defaults, the environment
//! (`GOPATH`, `HASHVEND_JOBS`, `HASHVEND_CANONICAL_DEPTH`), and command-line
//! overrides applied with the `with_*` setters.

use crate::error::{Error, Result};
use crate::importpath::DEFAULT_CANONICAL_DEPTH;
use std::path::{Path, PathBuf};

/// Environment variable overriding the rewrite worker count
pub const JOBS_ENV: &str = "HASHVEND_JOBS";

/// Environment variable overriding the canonicalization depth
pub const DEPTH_ENV: &str = "HASHVEND_CANONICAL_DEPTH";

/// Default location of vendored dependencies inside a package
pub const DEFAULT_VENDOR_DIR: &str = "vendor/gx/ipfs";

/// Default prefix of rewritten import paths
pub const DEFAULT_IMPORT_PREFIX: &str = "gx/ipfs";

/// Settings shared by the importer, the map builder, and the rewrite engine
#[derive(Debug, Clone)]
pub struct VendorConfig {
    /// Go workspace root (`$GOPATH`)
    pub gopath: PathBuf,
    /// Package-relative directory holding vendored dependencies
    pub vendor_dir: PathBuf,
    /// Prefix of canonical vendored import paths
    pub import_prefix: String,
    /// Number of leading segments that identify a repository
    pub canonical_depth: usize,
    /// Size of the rewrite worker pool
    pub workers: usize,
}

impl VendorConfig {
    /// Create a configuration rooted at the given workspace
    pub fn new(gopath: impl Into<PathBuf>) -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        Self {
            gopath: gopath.into(),
            vendor_dir: PathBuf::from(DEFAULT_VENDOR_DIR),
            import_prefix: DEFAULT_IMPORT_PREFIX.to_string(),
            canonical_depth: DEFAULT_CANONICAL_DEPTH,
            workers,
        }
    }

    /// Build a configuration from the environment
    ///
    /// Uses the first entry of `$GOPATH`, falling back to `~/go`. Fails if
    /// neither can be determined.
    pub fn from_env() -> Result<Self> {
        let gopath = match std::env::var_os("GOPATH").filter(|v| !v.is_empty()) {
            Some(value) => std::env::split_paths(&value).next().ok_or_else(|| {
                Error::Config("GOPATH is set but contains no paths".to_string())
            })?,
            None => dirs::home_dir()
                .map(|home| home.join("go"))
                .ok_or_else(|| {
                    Error::Config("GOPATH not set and home directory unknown".to_string())
                })?,
        };

        let mut config = Self::new(gopath);
        if let Some(jobs) = parse_positive(JOBS_ENV) {
            config.workers = jobs;
        }
        if let Some(depth) = parse_positive(DEPTH_ENV) {
            config.canonical_depth = depth;
        }
        Ok(config)
    }

    /// Set the vendored dependency directory
    pub fn with_vendor_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.vendor_dir = dir.into();
        self
    }

    /// Set the canonical import prefix
    pub fn with_import_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.import_prefix = prefix.into();
        self
    }

    /// Set the canonicalization depth
    pub fn with_canonical_depth(mut self, depth: usize) -> Self {
        self.canonical_depth = depth.max(1);
        self
    }

    /// Set the rewrite worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// `$GOPATH/src`
    pub fn src_dir(&self) -> PathBuf {
        self.gopath.join("src")
    }

    /// Shared cache of published packages, keyed by hash
    pub fn global_dir(&self) -> PathBuf {
        self.src_dir().join(&self.import_prefix)
    }

    /// Vendored dependency directory of the package at `root`
    pub fn vendor_dir_of(&self, root: &Path) -> PathBuf {
        root.join(&self.vendor_dir)
    }

    /// Import path of a directory inside `$GOPATH/src`
    pub fn import_path_of(&self, dir: &Path) -> Result<String> {
        let rel = dir.strip_prefix(self.src_dir()).map_err(|_| {
            Error::Config(format!(
                "{} is not within {}",
                dir.display(),
                self.src_dir().display()
            ))
        })?;
        let segments: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(segments.join("/"))
    }
}

fn parse_positive(var: &str) -> Option<usize> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VendorConfig::new("/home/dev/go");
        assert_eq!(config.vendor_dir, PathBuf::from("vendor/gx/ipfs"));
        assert_eq!(config.import_prefix, "gx/ipfs");
        assert_eq!(config.canonical_depth, 3);
        assert!(config.workers >= 1);
        assert_eq!(config.global_dir(), PathBuf::from("/home/dev/go/src/gx/ipfs"));
    }

    #[test]
    fn test_setters_clamp() {
        let config = VendorConfig::new("/go")
            .with_workers(0)
            .with_canonical_depth(0)
            .with_import_prefix("deps")
            .with_vendor_dir("third_party");
        assert_eq!(config.workers, 1);
        assert_eq!(config.canonical_depth, 1);
        assert_eq!(config.global_dir(), PathBuf::from("/go/src/deps"));
        assert_eq!(
            config.vendor_dir_of(Path::new("/work/pkg")),
            PathBuf::from("/work/pkg/third_party")
        );
    }

    #[test]
    fn test_import_path_of() {
        let config = VendorConfig::new("/go");
        assert_eq!(
            config.import_path_of(Path::new("/go/src/github.com/x/y")).unwrap(),
            "github.com/x/y"
        );
        assert!(config.import_path_of(Path::new("/elsewhere/y")).is_err());
    }
}
