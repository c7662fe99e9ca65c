// src/rewrite/mod.rs

//! Syntax-aware import rewriting
//!
//! - `scanner` / `imports`: parse and re-render import declarations
//! - `file`: rewrite one file in place
//! - `engine`: rewrite a whole tree on a worker pool
//! - `translate`: the path translation functions driving a rewrite

mod engine;
mod file;
mod imports;
mod scanner;
mod translate;

pub use engine::{is_source_file, FileFailure, RewriteEngine, RewriteReport, SKIP_DIRS, SOURCE_EXT};
pub use file::{rewrite_file, rewrite_source, RewriteOptions};
pub use imports::{parse_imports, rewrite_section, ImportDecl, ImportSection, ImportSpec};
pub use scanner::SyntaxError;
pub use translate::{PrefixMapper, Rename, Translate};
