// src/rewrite/file.rs

//! Rewriting the imports of a single source file

use super::imports::{parse_imports, rewrite_section};
use super::scanner::SyntaxError;
use super::translate::Translate;
use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Per-file rewrite behavior
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteOptions {
    /// Drop `// import "path"` comments from the package clause of
    /// rewritten files
    pub strip_import_comments: bool,
}

/// Translate the imports of in-memory source text
///
/// Returns `Ok(None)` if nothing changes. `path` is only used for error
/// messages.
pub fn rewrite_source<T: Translate + ?Sized>(
    path: &Path,
    src: &str,
    translate: &T,
    options: &RewriteOptions,
) -> Result<Option<String>> {
    let section = parse_imports(src).map_err(|e| syntax_error(path, src, &e))?;
    Ok(rewrite_section(
        src,
        &section,
        |p| translate.translate(p),
        options.strip_import_comments,
    ))
}

/// Translate the imports of a file in place
///
/// Returns whether the file was modified. Unchanged files are never
/// written. Changed files are written to a temporary sibling and renamed
/// over the original, so readers see either the old or the new content.
pub fn rewrite_file<T: Translate + ?Sized>(
    path: &Path,
    translate: &T,
    options: &RewriteOptions,
) -> Result<bool> {
    let src = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    let Some(output) = rewrite_source(path, &src, translate, options)? else {
        return Ok(false);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let permissions = fs::metadata(path)
        .map_err(|e| Error::io(path, e))?
        .permissions();

    // Dropping the temp file on any early return removes it
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(output.as_bytes())
        .map_err(|e| Error::io(tmp.path(), e))?;
    fs::set_permissions(tmp.path(), permissions).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

    debug!("Rewrote imports in {}", path.display());
    Ok(true)
}

fn syntax_error(path: &Path, src: &str, err: &SyntaxError) -> Error {
    let offset = err.offset.min(src.len());
    let before = src.get(..offset).unwrap_or(src);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
        + 1;
    Error::parse(path, format!("{}:{}: {}", line, column, err.message))
}
