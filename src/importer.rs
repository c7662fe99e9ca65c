// src/importer.rs

//! Publishing an import path and everything it depends on
//!
//! `Importer::publish` works bottom-up: a package is published only after
//! every external package it imports has been published, so its descriptor
//! can list their hashes and its sources can import them by vendored path.
//!
//! Import paths are reduced to their repository root before they are used
//! as keys, so all subpackages of one repository form a single package.
//! Each repository is published at most once per importer. A repository
//! that is reached again while it is still being published is reported as a
//! cyclic dependency.

use crate::config::VendorConfig;
use crate::descriptor::{Dependency, Package, PKG_FILE_NAME};
use crate::error::{Error, Result};
use crate::hash::ContentHash;
use crate::importpath::{
    canonicalize, is_stdlib, last_segment, strip_workspace_prefix, suffix_under, vendored_path,
};
use crate::mapping::DepMap;
use crate::oracle::{ImportClass, PathOracle};
use crate::prompt::NamePrompt;
use crate::rewrite::{RewriteEngine, RewriteOptions, Translate, SKIP_DIRS};
use crate::store::PackageStore;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Directories skipped while discovering subpackages, on top of the
/// rewrite engine's
const DISCOVERY_SKIP_DIRS: &[&str] = &["Godeps", "testdata"];

/// Per-invocation publish settings
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Rewrite each package's imports to vendored paths before publishing it
    pub rewrite: bool,
    /// Accept default package names without prompting
    pub yes_all: bool,
    /// Import paths that are already published; these are fetched, never
    /// analyzed
    pub overrides: DepMap,
    /// Options for the rewrite pass
    pub rewrite_options: RewriteOptions,
}

/// Rewrites imports of already-published repositories to their vendored
/// paths, keeping any subpackage suffix
pub struct MemoTranslator<'a> {
    memo: &'a BTreeMap<String, Dependency>,
    prefix: &'a str,
    depth: usize,
}

impl<'a> MemoTranslator<'a> {
    pub fn new(memo: &'a BTreeMap<String, Dependency>, prefix: &'a str, depth: usize) -> Self {
        Self {
            memo,
            prefix,
            depth,
        }
    }
}

impl Translate for MemoTranslator<'_> {
    fn translate(&self, path: &str) -> String {
        let key = canonicalize(path, self.depth);
        match (self.memo.get(key), suffix_under(path, key)) {
            (Some(dep), Some(rest)) => {
                format!(
                    "{}{}",
                    vendored_path(self.prefix, dep.hash.as_str(), &dep.name),
                    rest
                )
            }
            _ => path.to_string(),
        }
    }
}

/// Publishes dependency graphs through a store
pub struct Importer<O, S, P> {
    oracle: O,
    store: S,
    prompt: P,
    config: VendorConfig,
    options: ImportOptions,
    memo: BTreeMap<String, Dependency>,
    // Repositories currently being published, outermost first
    in_flight: Vec<String>,
}

impl<O, S, P> Importer<O, S, P>
where
    O: PathOracle,
    S: PackageStore,
    P: NamePrompt,
{
    pub fn new(oracle: O, store: S, prompt: P, config: VendorConfig) -> Self {
        Self {
            oracle,
            store,
            prompt,
            config,
            options: ImportOptions::default(),
            memo: BTreeMap::new(),
            in_flight: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// Everything published or fetched so far, keyed by repository root
    pub fn published(&self) -> &BTreeMap<String, Dependency> {
        &self.memo
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn key(&self, import_path: &str) -> String {
        canonicalize(import_path, self.config.canonical_depth).to_string()
    }

    /// Publish `import_path` and, first, everything it depends on
    pub fn publish(&mut self, import_path: &str) -> Result<Dependency> {
        let key = self.key(import_path);

        if let Some(dep) = self.memo.get(&key) {
            debug!("{} already published as {}", key, dep.hash);
            return Ok(dep.clone());
        }

        if let Some(pos) = self.in_flight.iter().position(|k| *k == key) {
            let mut chain = self.in_flight[pos..].to_vec();
            chain.push(key);
            return Err(Error::CyclicDependency { chain });
        }

        let override_hash = self
            .options
            .overrides
            .get(&key)
            .or_else(|| self.options.overrides.get(import_path))
            .cloned();
        if let Some(hash) = override_hash {
            return self.fetch_published(&key, hash).map_err(|e| e.in_import(&key));
        }

        self.in_flight.push(key.clone());
        let result = self.publish_fresh(&key);
        self.in_flight.pop();
        result.map_err(|e| e.in_import(&key))
    }

    fn fetch_published(&mut self, key: &str, hash: ContentHash) -> Result<Dependency> {
        let dest = self.config.global_dir().join(hash.as_str());
        if dest.exists() {
            debug!("{} already present at {}", hash, dest.display());
        } else {
            self.store.fetch(&hash, &dest)?;
        }
        let pkg = self.store.find_descriptor(&dest)?;

        let dep = Dependency::new(hash, pkg.name, non_empty(pkg.version));
        info!("Using published {} for {}", dep.hash, key);
        self.memo.insert(key.to_string(), dep.clone());
        Ok(dep)
    }

    fn publish_fresh(&mut self, key: &str) -> Result<Dependency> {
        let resolved = self.oracle.resolve(key)?;
        match resolved.class {
            ImportClass::Ok => {}
            ImportClass::NoSourceFiles => debug!("{} has no source files at its root", key),
            ImportClass::Ambiguous => return Err(Error::AmbiguousPackage(key.to_string())),
            ImportClass::Other(message) => {
                return Err(Error::Tool {
                    tool: "path oracle".to_string(),
                    message,
                })
            }
        }
        let dir = resolved.dir;
        let pkg_file = dir.join(PKG_FILE_NAME);

        let mut pkg = if pkg_file.is_file() {
            let mut pkg = Package::load(&pkg_file)?;
            // Dependencies are always recomputed from the import graph
            pkg.dependencies.clear();
            if pkg.origin_import().is_none() {
                pkg.gx.origin_import = Some(key.to_string());
            }
            pkg
        } else {
            let default = last_segment(key);
            let name = if self.options.yes_all {
                default.to_string()
            } else {
                self.prompt.package_name(key, default)?
            };
            Package::new(name, Some(key.to_string()))
        };

        let deps = self.deps_to_vendor(key, &dir)?;
        let total = deps.len();
        for (n, child) in deps.iter().enumerate() {
            info!("Processing dep {} for {} [{}/{}]", child, key, n + 1, total);
            let dep = self.publish(child)?;
            if !pkg.dependencies.iter().any(|d| d.hash == dep.hash) {
                pkg.dependencies.push(dep);
            }
        }

        pkg.save(&pkg_file)?;

        if self.options.rewrite {
            let translate =
                MemoTranslator::new(&self.memo, &self.config.import_prefix, self.config.canonical_depth);
            let report = RewriteEngine::new(self.config.workers)
                .with_options(self.options.rewrite_options)
                .rewrite_tree(&dir, &translate, |_| true)?;
            debug!("Rewrote {} files in {}", report.rewritten.len(), key);
            if !report.is_clean() {
                warn!(
                    "{} file(s) in {} could not be rewritten; publishing partially rewritten sources",
                    report.failures.len(),
                    key
                );
            }
        }

        let hash = self.store.publish(&dir, &pkg)?;
        info!("Published {} as {}", key, hash);

        let dep = Dependency::new(hash, pkg.name, non_empty(pkg.version));
        self.memo.insert(key.to_string(), dep.clone());
        Ok(dep)
    }

    /// External repositories imported by the package at `import_path`,
    /// see [`deps_to_vendor`]
    pub fn deps_to_vendor(&self, import_path: &str, dir: &Path) -> Result<Vec<String>> {
        deps_to_vendor(&self.oracle, import_path, dir, self.config.canonical_depth)
    }
}

/// External repositories imported by the package at `import_path`
///
/// `dir` is the package's local source directory. Imports of the package
/// and of every subpackage below it are merged; vendored, VCS, and
/// legacy-workspace directories are not searched. Paths inside the
/// package's own legacy `Godeps/_workspace` are unprefixed first. The
/// result holds repository roots, sorted, without standard library
/// packages and without the package's own repository.
pub fn deps_to_vendor<O: PathOracle + ?Sized>(
    oracle: &O,
    import_path: &str,
    dir: &Path,
    depth: usize,
) -> Result<Vec<String>> {
    let owner = canonicalize(import_path, depth);

    let mut packages = vec![import_path.to_string()];
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.file_type().is_dir() && (e.depth() == 0 || !is_excluded_dir(e.file_name()))
        });
    for entry in walker {
        let entry = entry?;
        let rel = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let segments: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        packages.push(format!("{}/{}", import_path, segments.join("/")));
    }

    let mut found = BTreeSet::new();
    for (i, package) in packages.iter().enumerate() {
        let listed = oracle.direct_imports(package)?;
        match listed.class {
            ImportClass::Ok | ImportClass::NoSourceFiles => {}
            ImportClass::Ambiguous => return Err(Error::AmbiguousPackage(package.clone())),
            ImportClass::Other(message) if i == 0 => {
                return Err(Error::Tool {
                    tool: "path oracle".to_string(),
                    message,
                })
            }
            ImportClass::Other(message) => {
                warn!("Skipping subpackage {}: {}", package, message);
                continue;
            }
        }

        for import in &listed.imports {
            let import = strip_workspace_prefix(import, owner);
            if is_stdlib(import) {
                continue;
            }
            let base = canonicalize(import, depth);
            if suffix_under(owner, base).is_some() || suffix_under(base, owner).is_some() {
                continue;
            }
            found.insert(base.to_string());
        }
    }

    Ok(found.into_iter().collect())
}

fn is_excluded_dir(name: &std::ffi::OsStr) -> bool {
    let Some(name) = name.to_str() else {
        return true;
    };
    name.starts_with('.')
        || name.starts_with('_')
        || SKIP_DIRS.contains(&name)
        || DISCOVERY_SKIP_DIRS.contains(&name)
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
