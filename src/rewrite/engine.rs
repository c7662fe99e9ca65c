// src/rewrite/engine.rs

//! Concurrent tree-wide import rewriting
//!
//! The walk runs on the calling thread and feeds a bounded channel; a fixed
//! pool of scoped worker threads drains it. When the channel is full the
//! walk blocks until a worker catches up.
//!
//! Failures on individual files are logged and collected in the report. Only
//! a root that cannot be resolved aborts the run.

use super::file::{rewrite_file, RewriteOptions};
use super::translate::Translate;
use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into
pub const SKIP_DIRS: &[&str] = &[".git", ".hg", ".svn", "vendor"];

/// Source file extension
pub const SOURCE_EXT: &str = "go";

/// A file that could not be rewritten
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// Outcome of a tree rewrite
#[derive(Debug, Default)]
pub struct RewriteReport {
    /// Files that were modified, sorted
    pub rewritten: Vec<PathBuf>,
    /// Candidate files whose imports needed no change
    pub unchanged: usize,
    /// Files that failed to parse or write
    pub failures: Vec<FileFailure>,
}

impl RewriteReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, path: PathBuf, result: Result<bool>) {
        match result {
            Ok(true) => self.rewritten.push(path),
            Ok(false) => self.unchanged += 1,
            Err(error) => {
                warn!("Failed to rewrite {}: {}", path.display(), error);
                self.failures.push(FileFailure { path, error });
            }
        }
    }
}

/// Walks a tree and rewrites candidate files on a worker pool
#[derive(Debug, Clone)]
pub struct RewriteEngine {
    workers: usize,
    options: RewriteOptions,
}

impl RewriteEngine {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            options: RewriteOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Rewrite every candidate file under `root`
    ///
    /// `filter` receives each candidate's path relative to the resolved root
    /// and returns false to exclude it.
    pub fn rewrite_tree<T, F>(&self, root: &Path, translate: &T, filter: F) -> Result<RewriteReport>
    where
        T: Translate + ?Sized,
        F: Fn(&Path) -> bool,
    {
        let root = root.canonicalize().map_err(|e| Error::io(root, e))?;
        if !root.is_dir() {
            return Err(Error::Config(format!("{} is not a directory", root.display())));
        }

        let mut report = RewriteReport::default();
        let (tx, rx) = flume::bounded::<PathBuf>(self.workers * 4);
        let options = &self.options;

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.workers)
                .map(|_| {
                    let rx = rx.clone();
                    scope.spawn(move || {
                        rx.iter()
                            .map(|path| {
                                let result = rewrite_file(&path, translate, options);
                                (path, result)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            drop(rx);

            let walker = WalkDir::new(&root)
                .follow_links(false)
                .into_iter()
                .filter_entry(|e| !is_skipped_dir(e));
            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                        report.record(path, Err(Error::from(e)));
                        continue;
                    }
                };
                if !is_candidate(&entry) {
                    continue;
                }
                let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
                if !filter(rel) {
                    debug!("Filtered out {}", rel.display());
                    continue;
                }
                // Workers only disconnect by panicking; the join below surfaces that
                if tx.send(entry.into_path()).is_err() {
                    break;
                }
            }
            drop(tx);

            for handle in handles {
                match handle.join() {
                    Ok(results) => {
                        for (path, result) in results {
                            report.record(path, result);
                        }
                    }
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });

        report.rewritten.sort();
        debug!(
            "Rewrite of {}: {} rewritten, {} unchanged, {} failed",
            root.display(),
            report.rewritten.len(),
            report.unchanged,
            report.failures.len()
        );
        Ok(report)
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIP_DIRS.contains(&name))
}

/// True for `.go` files not hidden from the toolchain by a `.` or `_` prefix
pub fn is_source_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(OsStr::to_str) else {
        return false;
    };
    path.extension() == Some(OsStr::new(SOURCE_EXT))
        && !name.starts_with('.')
        && !name.starts_with('_')
}

fn is_candidate(entry: &DirEntry) -> bool {
    entry.file_type().is_file() && is_source_file(entry.path())
}
