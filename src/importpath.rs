// src/importpath.rs

//! Import path helpers
//!
//! Import paths are compared by exact string equality. The one normalization
//! we apply is canonicalization: cutting a path down to its first `depth`
//! segments so every subpackage of a repository maps to the same key
//! (`github.com/x/y/sub/pkg` -> `github.com/x/y` at depth 3).

/// Marker of a legacy flattened Godeps workspace inside a repository
pub const GODEPS_WORKSPACE: &str = "Godeps/_workspace/src/";

/// Default number of segments kept by [`canonicalize`]
pub const DEFAULT_CANONICAL_DEPTH: usize = 3;

/// True if the path belongs to the standard library
///
/// Remote paths start with a host name, so the first segment contains a dot.
pub fn is_stdlib(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or_default();
    !first.contains('.')
}

/// Reduce an import path to its repository root
///
/// `depth` counts path segments, host included, so the default of 3 keeps
/// `host/owner/repo`: `github.com/x/y/sub` -> `github.com/x/y`, and
/// `example.org/repo/sub/pkg` -> `example.org/repo/sub`. Hosts that serve
/// repositories one level down (`example.org/repo`) need a depth of 2.
///
/// Paths with fewer than `depth` segments are returned unchanged. A depth of
/// zero is treated as one.
pub fn canonicalize(path: &str, depth: usize) -> &str {
    let depth = depth.max(1);
    match path.match_indices('/').nth(depth - 1) {
        Some((idx, _)) => &path[..idx],
        None => path,
    }
}

/// Strip a legacy flattened-workspace prefix from an import
///
/// `github.com/a/b/Godeps/_workspace/src/github.com/c/d` -> `github.com/c/d`.
/// Only the workspace of `owner` (the canonical path of the package being
/// scanned) is unprefixed.
pub fn strip_workspace_prefix<'a>(import: &'a str, owner: &str) -> &'a str {
    let prefix = format!("{}/{}", owner, GODEPS_WORKSPACE);
    import.strip_prefix(prefix.as_str()).unwrap_or(import)
}

/// Last segment of an import path, used as the default package name
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// If `path` is `base` or lies beneath it, return the remainder (with its
/// leading slash, or empty for an exact match)
pub fn suffix_under<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(base)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Build the canonical vendored import path for a published dependency
pub fn vendored_path(prefix: &str, hash: &str, name: &str) -> String {
    if prefix.is_empty() {
        format!("{}/{}", hash, name)
    } else {
        format!("{}/{}/{}", prefix.trim_end_matches('/'), hash, name)
    }
}
