// src/rewrite/translate.rs

//! Import path translation functions
//!
//! A translator is shared by every worker of the rewrite engine, so it must
//! be `Sync`. Stateful translators keep their state behind a single mutex
//! that is held only for the cache lookup or insert.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

/// Maps an import path to the path it should be rewritten to
///
/// Returning the input unchanged leaves the import alone.
pub trait Translate: Sync {
    fn translate(&self, path: &str) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str) -> String + Sync,
{
    fn translate(&self, path: &str) -> String {
        self(path)
    }
}

/// Prefix-based translation with a memoizing cache
///
/// An exact key match wins. Otherwise the longest key `k` for which the
/// path starts with `k/` has that prefix replaced by its value, keeping the
/// remainder. Paths matching nothing pass through unchanged.
pub struct PrefixMapper {
    mapping: BTreeMap<String, String>,
    cache: Mutex<HashMap<String, String>>,
}

impl PrefixMapper {
    pub fn new(mapping: BTreeMap<String, String>) -> Self {
        Self {
            mapping,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct paths answered so far
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }

    fn compute(&self, path: &str) -> String {
        if let Some(exact) = self.mapping.get(path) {
            return exact.clone();
        }

        self.mapping
            .iter()
            .filter(|(from, _)| {
                path.strip_prefix(from.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|(from, _)| from.len())
            .map(|(from, to)| format!("{}{}", to, &path[from.len()..]))
            .unwrap_or_else(|| path.to_string())
    }
}

impl Translate for PrefixMapper {
    fn translate(&self, path: &str) -> String {
        if let Some(hit) = self.cache.lock().get(path) {
            return hit.clone();
        }

        let result = self.compute(path);
        // Another worker may have raced us here; both computed the same answer
        self.cache
            .lock()
            .entry(path.to_string())
            .or_insert(result)
            .clone()
    }
}

/// Exact rename of one import path
#[derive(Debug, Clone)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

impl Rename {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Translate for Rename {
    fn translate(&self, path: &str) -> String {
        if path == self.from {
            self.to.clone()
        } else {
            path.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn mapper(pairs: &[(&str, &str)]) -> PrefixMapper {
        PrefixMapper::new(
            pairs
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_exact_and_prefix() {
        let m = mapper(&[
            ("github.com/x/y", "gx/ipfs/QmA/y"),
            ("github.com/x/y/sub", "gx/ipfs/QmB/sub"),
        ]);
        assert_eq!(m.translate("github.com/x/y"), "gx/ipfs/QmA/y");
        assert_eq!(m.translate("github.com/x/y/other"), "gx/ipfs/QmA/y/other");
        assert_eq!(m.translate("github.com/x/y/sub/deep"), "gx/ipfs/QmB/sub/deep");
        assert_eq!(m.translate("github.com/x/yy"), "github.com/x/yy");
        assert_eq!(m.translate("fmt"), "fmt");
    }

    #[test]
    fn test_cache_records_pass_through() {
        let m = mapper(&[("a.com/b", "c.com/d")]);
        m.translate("a.com/b");
        m.translate("a.com/b");
        m.translate("fmt");
        assert_eq!(m.cached(), 2);
    }

    #[test]
    fn test_shared_across_threads() {
        let m = Arc::new(mapper(&[("a.com/b", "c.com/d")]));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let m = Arc::clone(&m);
                std::thread::spawn(move || m.translate(&format!("a.com/b/p{}", i % 2)))
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap().starts_with("c.com/d/p"));
        }
        assert_eq!(m.cached(), 2);
    }

    #[test]
    fn test_rename_and_closure() {
        let r = Rename::new("old.com/x", "new.com/x");
        assert_eq!(r.translate("old.com/x"), "new.com/x");
        assert_eq!(r.translate("old.com/x/sub"), "old.com/x/sub");

        let upper = |p: &str| p.to_uppercase();
        assert_eq!(upper.translate("abc"), "ABC");
    }
}
