// src/mapping.rs

//! Rewrite maps built from the published dependency graph
//!
//! A rewrite map sends each dependency's origin import path to its vendored
//! path (`<prefix>/<hash>/<name>`), or the other way round for undo. It is
//! built by a depth-first walk over `gxDependencies`, loading every
//! descriptor from the package's vendor directory or, failing that, from the
//! shared global cache.
//!
//! Entries contributed by the root package's own dependency list may replace
//! earlier entries. Entries contributed deeper in the graph never replace an
//! existing entry; disagreements are recorded as conflicts and logged.

use crate::config::VendorConfig;
use crate::descriptor::{Dependency, Package};
use crate::error::{Error, Result};
use crate::hash::ContentHash;
use crate::importpath::{last_segment, vendored_path};
use crate::rewrite::{PrefixMapper, Translate};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Flat origin import path -> hash table across the dependency graph
pub type DepMap = BTreeMap<String, ContentHash>;

/// A rejected attempt to replace a rewrite map entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub key: String,
    pub kept: String,
    pub rejected: String,
}

/// Original import path -> replacement import path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteMap {
    entries: BTreeMap<String, String>,
    conflicts: Vec<Conflict>,
}

impl RewriteMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, from: &str) -> Option<&str> {
        self.entries.get(from).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Conflicts seen while building, in discovery order
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Add an entry, replacing an existing one only if `overwrite` is set
    pub fn insert(&mut self, from: String, to: String, overwrite: bool) {
        match self.entries.get(&from) {
            Some(existing) if !overwrite => {
                if *existing != to {
                    warn!(
                        "Not overwriting rewrite of {} to {} with {}",
                        from, existing, to
                    );
                    self.conflicts.push(Conflict {
                        key: from,
                        kept: existing.clone(),
                        rejected: to,
                    });
                }
            }
            _ => {
                self.entries.insert(from, to);
            }
        }
    }

    /// Keep only entries whose vendored side ends in one of `names`
    ///
    /// The vendored side is the value for a forward map and the key for an
    /// undo map.
    pub fn retain_names(&mut self, names: &BTreeSet<String>, undo: bool) {
        self.entries.retain(|from, to| {
            let vendored = if undo { from } else { to };
            names.contains(last_segment(vendored))
        });
    }

    /// Write the map as two aligned columns, one entry per line
    pub fn write_table<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let width = self.entries.keys().map(|k| k.len()).max().unwrap_or(0);
        for (from, to) in &self.entries {
            writeln!(out, "{:width$}  {}", from, to, width = width)?;
        }
        Ok(())
    }

    /// Turn the map into a caching prefix translator
    pub fn into_mapper(self) -> PrefixMapper {
        PrefixMapper::new(self.entries)
    }
}

/// Load the descriptor of a dependency, preferring the local vendor
/// directory over the global cache
pub fn load_dependency(
    dep: &Dependency,
    vendor_dir: &Path,
    global_dir: &Path,
    parent: &str,
) -> Result<Package> {
    let local = vendor_dir.join(dep.hash.as_str());
    debug!("Loading dependency {} ({})", dep.name, dep.hash);
    match Package::find_in_dir(&local) {
        Ok(pkg) => return Ok(pkg),
        Err(e) => debug!("Not in {}: {}", local.display(), e),
    }

    let global = global_dir.join(dep.hash.as_str());
    debug!("Checking global cache {}", global.display());
    Package::find_in_dir(&global).map_err(|e| {
        debug!("Failed to load dependency {} of {}: {}", dep.name, parent, e);
        Error::DependencyNotFound {
            name: dep.name.clone(),
            parent: parent.to_string(),
        }
    })
}

struct MapBuilder<'a> {
    vendor_dir: &'a Path,
    global_dir: PathBuf,
    prefix: &'a str,
    undo: bool,
    // hash -> (name, origin) of every descriptor loaded so far
    seen: HashMap<ContentHash, (String, Option<String>)>,
    map: RewriteMap,
}

impl MapBuilder<'_> {
    fn add(&mut self, hash: &ContentHash, overwrite: bool) {
        let Some((name, Some(origin))) = self.seen.get(hash) else {
            return;
        };
        let vendored = vendored_path(self.prefix, hash.as_str(), name);
        let (from, to) = if self.undo {
            (vendored, origin.clone())
        } else {
            (origin.clone(), vendored)
        };
        self.map.insert(from, to, overwrite);
    }

    fn process(&mut self, pkg: &Package, root: bool) -> Result<()> {
        for dep in &pkg.dependencies {
            if self.seen.contains_key(&dep.hash) {
                self.add(&dep.hash, root);
                continue;
            }

            let child = load_dependency(dep, self.vendor_dir, &self.global_dir, &pkg.name)?;
            self.seen.insert(
                dep.hash.clone(),
                (child.name.clone(), child.origin_import().map(str::to_string)),
            );
            self.add(&dep.hash, root);
            self.process(&child, false)?;
        }
        Ok(())
    }
}

/// Build the rewrite map for a package
///
/// `vendor_dir` is where the package's dependencies are vendored (usually
/// `config.vendor_dir_of(root)`). With `undo` the map points vendored paths
/// back at their origins.
pub fn build_rewrite_map(
    root: &Package,
    vendor_dir: &Path,
    config: &VendorConfig,
    undo: bool,
) -> Result<RewriteMap> {
    let mut builder = MapBuilder {
        vendor_dir,
        global_dir: config.global_dir(),
        prefix: &config.import_prefix,
        undo,
        seen: HashMap::new(),
        map: RewriteMap::new(),
    };
    builder.process(root, true)?;
    debug!(
        "Rewrite map for {}: {} entries, {} conflicts",
        root.name,
        builder.map.len(),
        builder.map.conflicts.len()
    );
    Ok(builder.map)
}

/// Map every origin import path in the dependency graph to its hash
///
/// The first hash seen for an origin wins; later, different hashes are
/// logged. The subtree of a duplicate origin is not walked again.
pub fn build_dep_map(root: &Package, vendor_dir: &Path, config: &VendorConfig) -> Result<DepMap> {
    fn walk(
        pkg: &Package,
        vendor_dir: &Path,
        global_dir: &Path,
        visited: &mut HashSet<ContentHash>,
        map: &mut DepMap,
    ) -> Result<()> {
        for dep in &pkg.dependencies {
            if !visited.insert(dep.hash.clone()) {
                continue;
            }
            let child = load_dependency(dep, vendor_dir, global_dir, &pkg.name)?;

            if let Some(origin) = child.origin_import() {
                if let Some(existing) = map.get(origin) {
                    if *existing != dep.hash {
                        warn!(
                            "Two dependencies share import path {}: {} and {}",
                            origin, existing, dep.hash
                        );
                    }
                    continue;
                }
                map.insert(origin.to_string(), dep.hash.clone());
            }

            walk(&child, vendor_dir, global_dir, visited, map)?;
        }
        Ok(())
    }

    let mut map = DepMap::new();
    walk(
        root,
        vendor_dir,
        &config.global_dir(),
        &mut HashSet::new(),
        &mut map,
    )?;
    Ok(map)
}

/// Error-tolerant undo translator
///
/// Sends `<prefix>/<hash>/<name>/rest` back to `<origin>/rest`, reading the
/// origin from the descriptor of `<hash>` in the global cache. Paths whose
/// descriptor is missing or records no origin are left alone.
pub struct FixTranslator {
    global_dir: PathBuf,
    prefix: String,
    // vendored root -> origin, None when unresolvable
    cache: Mutex<HashMap<String, Option<String>>>,
}

impl FixTranslator {
    pub fn new(config: &VendorConfig) -> Self {
        Self {
            global_dir: config.global_dir(),
            prefix: config.import_prefix.trim_end_matches('/').to_string(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn lookup(&self, hash: &str, root: &str) -> Option<String> {
        let dir = self.global_dir.join(hash);
        match Package::find_in_dir(&dir) {
            Ok(pkg) => {
                let origin = pkg.origin_import().map(str::to_string);
                if origin.is_none() {
                    warn!("Package {} has no origin import path", root);
                }
                origin
            }
            Err(e) => {
                warn!("Cannot resolve {}: {}", root, e);
                None
            }
        }
    }
}

impl Translate for FixTranslator {
    fn translate(&self, path: &str) -> String {
        let rest = if self.prefix.is_empty() {
            Some(path)
        } else {
            path.strip_prefix(self.prefix.as_str())
                .and_then(|r| r.strip_prefix('/'))
        };
        let Some(rest) = rest else {
            return path.to_string();
        };
        let mut parts = rest.splitn(3, '/');
        let (Some(hash), Some(name)) = (parts.next(), parts.next()) else {
            return path.to_string();
        };
        let root_len = path.len() - rest.len() + hash.len() + 1 + name.len();
        let (root, suffix) = path.split_at(root_len);

        if let Some(hit) = self.cache.lock().get(root) {
            return match hit {
                Some(origin) => format!("{}{}", origin, suffix),
                None => path.to_string(),
            };
        }

        let origin = self.lookup(hash, root);
        let result = match &origin {
            Some(origin) => format!("{}{}", origin, suffix),
            None => path.to_string(),
        };
        self.cache.lock().insert(root.to_string(), origin);
        result
    }
}

/// Read a dep-map document
pub fn load_dep_map(path: &Path) -> Result<DepMap> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}
