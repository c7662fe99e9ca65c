// src/descriptor.rs

//! Package descriptors (`package.json`)
//!
//! A descriptor lives next to the package source and records the package
//! name, version, and the published dependencies it was built against.
//! Go-specific data (the import path the package originally came from, and
//! an optional minimum toolchain version) sits in a typed `gx` block.
//!
//! ```json
//! {
//!   "name": "y",
//!   "version": "0.0.0",
//!   "language": "go",
//!   "gxDependencies": [
//!     { "hash": "QmZ...", "name": "w", "version": "1.2.0" }
//!   ],
//!   "gx": { "dvcsimport": "github.com/x/y" }
//! }
//! ```
//!
//! Fields we do not model are kept in `extra` and written back unchanged.

use crate::error::{Error, Result};
use crate::hash::ContentHash;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of a package descriptor
pub const PKG_FILE_NAME: &str = "package.json";

/// Version given to freshly initialized packages
pub const INITIAL_VERSION: &str = "0.0.0";

/// A resolved, published reference to another package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub hash: ContentHash,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Dependency {
    pub fn new(hash: ContentHash, name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            author: None,
            hash,
            name: name.into(),
            version,
        }
    }
}

/// Go-specific descriptor extension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoInfo {
    /// Import path the package was published from
    #[serde(rename = "dvcsimport", default, skip_serializing_if = "Option::is_none")]
    pub origin_import: Option<String>,

    /// Minimum compiler version the package needs
    #[serde(rename = "goversion", default, skip_serializing_if = "Option::is_none")]
    pub go_version: Option<String>,
}

impl GoInfo {
    fn is_empty(&self) -> bool {
        self.origin_import.is_none() && self.go_version.is_none()
    }
}

/// A package descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Published dependencies, in the order they were resolved
    #[serde(rename = "gxDependencies", default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,

    #[serde(default, skip_serializing_if = "GoInfo::is_empty")]
    pub gx: GoInfo,

    /// Unmodelled fields, preserved across load/save
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Package {
    /// Create a descriptor for a newly recognized Go package
    pub fn new(name: impl Into<String>, origin_import: Option<String>) -> Self {
        Self {
            name: name.into(),
            version: INITIAL_VERSION.to_string(),
            language: Some("go".to_string()),
            gx: GoInfo {
                origin_import,
                go_version: None,
            },
            ..Default::default()
        }
    }

    /// Import path this package was published from, if recorded
    pub fn origin_import(&self) -> Option<&str> {
        self.gx.origin_import.as_deref().filter(|s| !s.is_empty())
    }

    /// Load a descriptor from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let pkg: Package = serde_json::from_str(&content)?;
        Ok(pkg)
    }

    /// Write the descriptor to a file, replacing it atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut content = serde_json::to_vec_pretty(self)?;
        content.push(b'\n');

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
        tmp.write_all(&content).map_err(|e| Error::io(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

        debug!("Saved package file {}", path.display());
        Ok(())
    }

    /// Load the descriptor of a package directory
    ///
    /// Looks for `dir/package.json` first. Vendored packages are stored as
    /// `<hash>/<name>/...`, so if that fails and `dir` holds exactly one
    /// subdirectory, its descriptor is used instead.
    pub fn find_in_dir(dir: &Path) -> Result<Self> {
        let direct = dir.join(PKG_FILE_NAME);
        if direct.is_file() {
            return Self::load(&direct);
        }

        let mut subdirs = Vec::new();
        let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(dir, e))?;
            if entry.file_type().map_err(|e| Error::io(entry.path(), e))?.is_dir() {
                subdirs.push(entry.path());
            }
        }

        match subdirs.as_slice() {
            [only] => Self::load(&only.join(PKG_FILE_NAME)),
            _ => Err(Error::io(
                direct,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no package file found"),
            )),
        }
    }
}

/// Walk up from `start` to the nearest directory holding a package file
pub fn find_package_root(start: &Path) -> Result<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        if current.join(PKG_FILE_NAME).is_file() {
            return Ok(current.to_path_buf());
        }
        dir = current.parent();
    }
    Err(Error::Config(format!(
        "no {} found in {} or any parent directory",
        PKG_FILE_NAME,
        start.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
  "author": "someone",
  "bugs": { "url": "https://example.com/issues" },
  "gx": { "dvcsimport": "github.com/x/y", "goversion": "1.9" },
  "gxDependencies": [
    { "hash": "QmDep", "name": "w", "version": "1.2.0" }
  ],
  "language": "go",
  "license": "MIT",
  "name": "y",
  "version": "0.3.1"
}"#;

    #[test]
    fn test_parse_descriptor() {
        let pkg: Package = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(pkg.name, "y");
        assert_eq!(pkg.version, "0.3.1");
        assert_eq!(pkg.origin_import(), Some("github.com/x/y"));
        assert_eq!(pkg.gx.go_version.as_deref(), Some("1.9"));
        assert_eq!(pkg.dependencies.len(), 1);
        assert_eq!(pkg.dependencies[0].hash.as_str(), "QmDep");
        assert!(pkg.extra.contains_key("bugs"));
        assert!(pkg.extra.contains_key("license"));
    }

    #[test]
    fn test_save_preserves_unknown_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PKG_FILE_NAME);
        let pkg: Package = serde_json::from_str(SAMPLE).unwrap();

        pkg.save(&path).unwrap();
        let reloaded = Package::load(&path).unwrap();
        assert_eq!(reloaded, pkg);
        assert_eq!(reloaded.extra["license"], "MIT");
    }

    #[test]
    fn test_empty_origin_is_none() {
        let mut pkg = Package::new("y", Some(String::new()));
        assert_eq!(pkg.origin_import(), None);
        pkg.gx.origin_import = Some("github.com/x/y".to_string());
        assert_eq!(pkg.origin_import(), Some("github.com/x/y"));
    }

    #[test]
    fn test_new_package_serialization() {
        let pkg = Package::new("y", Some("github.com/x/y".to_string()));
        let json = serde_json::to_value(&pkg).unwrap();
        assert_eq!(json["version"], INITIAL_VERSION);
        assert_eq!(json["language"], "go");
        assert_eq!(json["gx"]["dvcsimport"], "github.com/x/y");
        assert!(json.get("gxDependencies").is_none());
    }

    #[test]
    fn test_find_in_dir_direct_and_nested() {
        let temp = TempDir::new().unwrap();

        let direct = temp.path().join("direct");
        fs::create_dir_all(&direct).unwrap();
        Package::new("a", None).save(&direct.join(PKG_FILE_NAME)).unwrap();
        assert_eq!(Package::find_in_dir(&direct).unwrap().name, "a");

        let nested = temp.path().join("QmHash");
        fs::create_dir_all(nested.join("b")).unwrap();
        Package::new("b", None).save(&nested.join("b").join(PKG_FILE_NAME)).unwrap();
        assert_eq!(Package::find_in_dir(&nested).unwrap().name, "b");
    }

    #[test]
    fn test_find_in_dir_missing() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("one")).unwrap();
        fs::create_dir_all(temp.path().join("two")).unwrap();
        let err = Package::find_in_dir(temp.path()).unwrap_err();
        assert!(err.is_not_found());

        let err = Package::find_in_dir(&temp.path().join("absent")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_find_package_root() {
        let temp = TempDir::new().unwrap();
        Package::new("root", None).save(&temp.path().join(PKG_FILE_NAME)).unwrap();
        let deep = temp.path().join("a").join("b");
        fs::create_dir_all(&deep).unwrap();

        assert_eq!(find_package_root(&deep).unwrap(), temp.path());
    }

    #[test]
    fn test_find_package_root_none() {
        let temp = TempDir::new().unwrap();
        // An ancestor of the temp dir may legitimately hold a package file
        if let Err(err) = find_package_root(temp.path()) {
            assert!(matches!(err, Error::Config(ref msg) if msg.contains(PKG_FILE_NAME)));
        }
    }
}
