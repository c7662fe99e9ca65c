// tests/common/mod.rs

//! Shared test utilities: in-memory path oracle and package store, plus
//! fixture writers.

#![allow(dead_code)]

use hashvend::descriptor::{Dependency, Package, PKG_FILE_NAME};
use hashvend::oracle::{DirectImports, ImportClass, PathOracle, Resolved};
use hashvend::store::PackageStore;
use hashvend::{ContentHash, Error, Result, VendorConfig};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `content` at `root/rel`, creating parent directories
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

/// A Go source file importing `imports` in one grouped declaration
pub fn go_source(package: &str, imports: &[&str]) -> String {
    let mut src = format!("package {}\n\nimport (\n", package);
    for import in imports {
        src.push_str(&format!("\t\"{}\"\n", import));
    }
    src.push_str(")\n\nfunc init() {}\n");
    src
}

/// Vendor a descriptor at `<dir>/<hash>/<name>/package.json`
pub fn vendor_package(
    dir: &Path,
    hash: &str,
    name: &str,
    origin: Option<&str>,
    deps: Vec<Dependency>,
) {
    let pkg_dir = dir.join(hash).join(name);
    fs::create_dir_all(&pkg_dir).unwrap();
    let mut pkg = Package::new(name, origin.map(str::to_string));
    pkg.dependencies = deps;
    pkg.save(&pkg_dir.join(PKG_FILE_NAME)).unwrap();
}

pub fn dep(hash: &str, name: &str) -> Dependency {
    Dependency::new(ContentHash::new(hash).unwrap(), name, None)
}

/// A temporary Go workspace
pub struct Workspace {
    pub temp: TempDir,
    pub config: VendorConfig,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let config = VendorConfig::new(temp.path().join("gopath")).with_workers(2);
        Self { temp, config }
    }

    /// Source directory of an import path
    pub fn src(&self, import_path: &str) -> PathBuf {
        self.config.src_dir().join(import_path)
    }
}

/// Path oracle over a fixed table of packages
///
/// Resolving creates the package directory under `$GOPATH/src`; import
/// lists come from the table. Unknown repositories are not found.
pub struct FakeOracle {
    src_dir: PathBuf,
    imports: BTreeMap<String, BTreeSet<String>>,
    classes: BTreeMap<String, ImportClass>,
    pub resolved: Mutex<Vec<String>>,
}

impl FakeOracle {
    pub fn new(config: &VendorConfig) -> Self {
        Self {
            src_dir: config.src_dir(),
            imports: BTreeMap::new(),
            classes: BTreeMap::new(),
            resolved: Mutex::new(Vec::new()),
        }
    }

    /// Declare a package and its direct imports
    pub fn package(mut self, import_path: &str, imports: &[&str]) -> Self {
        self.imports.insert(
            import_path.to_string(),
            imports.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Override the classification reported for a package
    pub fn class(mut self, import_path: &str, class: ImportClass) -> Self {
        self.classes.insert(import_path.to_string(), class);
        self
    }

    fn known(&self, import_path: &str) -> bool {
        self.imports.keys().any(|k| {
            k == import_path || k.starts_with(&format!("{}/", import_path))
        })
    }
}

impl PathOracle for FakeOracle {
    fn resolve(&self, import_path: &str) -> Result<Resolved> {
        if !self.known(import_path) {
            return Err(Error::NotFound(import_path.to_string()));
        }
        self.resolved.lock().push(import_path.to_string());
        let dir = self.src_dir.join(import_path);
        fs::create_dir_all(&dir)?;
        let class = if self.imports.contains_key(import_path) {
            ImportClass::Ok
        } else {
            ImportClass::NoSourceFiles
        };
        Ok(Resolved { dir, class })
    }

    fn direct_imports(&self, import_path: &str) -> Result<DirectImports> {
        let class = self.classes.get(import_path).cloned();
        match self.imports.get(import_path) {
            Some(imports) => Ok(DirectImports {
                imports: imports.clone(),
                class: class.unwrap_or(ImportClass::Ok),
            }),
            None => Ok(DirectImports {
                imports: BTreeSet::new(),
                class: class.unwrap_or(ImportClass::NoSourceFiles),
            }),
        }
    }
}

/// Package store handing out sequential hashes
#[derive(Default)]
pub struct FakeStore {
    /// (package name, directory) of every publish, in order
    pub published: Mutex<Vec<(String, PathBuf)>>,
    /// Trees available for fetching
    pub fetchable: BTreeMap<ContentHash, Package>,
    pub fetched: Mutex<Vec<ContentHash>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fetchable(mut self, hash: &str, pkg: Package) -> Self {
        self.fetchable.insert(ContentHash::new(hash).unwrap(), pkg);
        self
    }

    pub fn publish_count(&self, name: &str) -> usize {
        self.published.lock().iter().filter(|(n, _)| n == name).count()
    }
}

impl PackageStore for FakeStore {
    fn publish(&self, dir: &Path, pkg: &Package) -> Result<ContentHash> {
        let mut published = self.published.lock();
        published.push((pkg.name.clone(), dir.to_path_buf()));
        ContentHash::new(format!("QmFake{}", published.len()))
    }

    fn fetch(&self, hash: &ContentHash, dest: &Path) -> Result<()> {
        let pkg = self
            .fetchable
            .get(hash)
            .ok_or_else(|| Error::NotFound(hash.to_string()))?;
        let dir = dest.join(&pkg.name);
        fs::create_dir_all(&dir)?;
        pkg.save(&dir.join(PKG_FILE_NAME))?;
        self.fetched.lock().push(hash.clone());
        Ok(())
    }
}
