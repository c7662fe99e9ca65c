// src/hash.rs

//! Content identifiers handed out by the package store
//!
//! The store decides how a tree is hashed; to us an identifier is an opaque,
//! immutable token (for IPFS-backed stores a base58 multihash such as
//! `QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG`). The only structure we
//! rely on is that it can be embedded as one segment of an import path.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a published package tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Validate and wrap an identifier
    ///
    /// Identifiers must be non-empty and ASCII alphanumeric so they can be used
    /// verbatim as a directory name and an import path segment.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidHash(value));
        }
        Ok(Self(value))
    }

    /// Get the identifier as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.trim())
    }
}

impl TryFrom<String> for ContentHash {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_hash() {
        let hash = ContentHash::new("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG").unwrap();
        assert_eq!(hash.as_str(), "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG");
        assert_eq!(hash.to_string(), hash.as_str());
    }

    #[test]
    fn test_rejects_path_characters() {
        assert!(ContentHash::new("").is_err());
        assert!(ContentHash::new("Qm/abc").is_err());
        assert!(ContentHash::new("Qm abc").is_err());
        assert!(ContentHash::new("..").is_err());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let hash: ContentHash = " QmFoo\n".parse().unwrap();
        assert_eq!(hash.as_str(), "QmFoo");
    }

    #[test]
    fn test_serde_as_string() {
        let hash = ContentHash::new("QmBar").unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"QmBar\"");
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
        assert!(serde_json::from_str::<ContentHash>("\"../etc\"").is_err());
    }
}
