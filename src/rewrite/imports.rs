// src/rewrite/imports.rs

//! Import declaration parsing and rendering
//!
//! Parses the package clause and every import declaration that follows it,
//! stopping at the first other declaration; function bodies are never
//! tokenized. Each spec records the byte span of its path literal so edits
//! can be spliced into the original text.
//!
//! When a grouped declaration has to change it is rendered canonically:
//! one spec per line, tab-indented, blank-line separated groups kept as they
//! are, and specs inside a group sorted by path then name with exact
//! duplicates dropped. Comments travel with the spec they belong to.

use super::scanner::{quote, unquote, Scanner, SyntaxError, Token, TokenKind};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// One import spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Local name (`foo`, `.` or `_`), if any
    pub name: Option<String>,
    /// Decoded import path
    pub path: String,
    /// Byte span of the path literal
    pub literal: Range<usize>,
    /// Comments between the local name and the path literal
    pub comments: Vec<Range<usize>>,
}

/// Where an entry of a grouped declaration sits
#[derive(Debug, Clone, PartialEq, Eq)]
enum EntryKind {
    Spec(usize),
    Comment(Range<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    kind: EntryKind,
    first_line: usize,
    last_line: usize,
}

/// One `import` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// From the `import` keyword to the closing paren or the path literal
    pub span: Range<usize>,
    /// Span of `import (` for grouped declarations
    head: Option<Range<usize>>,
    pub specs: Vec<ImportSpec>,
    entries: Vec<Entry>,
}

impl ImportDecl {
    /// True for `import ( ... )`
    pub fn is_grouped(&self) -> bool {
        self.head.is_some()
    }
}

/// The parsed head of a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSection {
    pub package_name: String,
    /// Whitespace and comment of a canonical import comment
    /// (`package foo // import "x"`), if present
    pub import_comment: Option<Range<usize>>,
    pub decls: Vec<ImportDecl>,
}

impl ImportSection {
    /// All import specs in source order
    pub fn specs(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls.iter().flat_map(|d| d.specs.iter())
    }

    /// Span from the first import keyword to the end of the last declaration
    pub fn span(&self) -> Option<Range<usize>> {
        let first = self.decls.first()?;
        let last = self.decls.last()?;
        Some(first.span.start..last.span.end)
    }
}

struct Parser<'a> {
    src: &'a str,
    scanner: Scanner<'a>,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            scanner: Scanner::new(src),
            peeked: None,
        }
    }

    fn next(&mut self) -> Result<Token, SyntaxError> {
        match self.peeked.take() {
            Some(tok) => Ok(tok),
            None => self.scanner.next_token(),
        }
    }

    fn push_back(&mut self, tok: Token) {
        self.peeked = Some(tok);
    }

    /// Next token that is not a comment (or newline, if `skip_newlines`)
    fn next_significant(&mut self, skip_newlines: bool) -> Result<Token, SyntaxError> {
        loop {
            let tok = self.next()?;
            if tok.is_comment() || (skip_newlines && tok.kind == TokenKind::Newline) {
                continue;
            }
            return Ok(tok);
        }
    }

    fn error(&self, tok: &Token, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            offset: tok.span.start,
            message: message.into(),
        }
    }

    fn text(&self, tok: &Token) -> &'a str {
        tok.text(self.src)
    }

    fn parse(mut self) -> Result<ImportSection, SyntaxError> {
        let tok = self.next_significant(true)?;
        if tok.kind != TokenKind::Ident || self.text(&tok) != "package" {
            return Err(self.error(&tok, "expected 'package' clause"));
        }
        let name = self.next_significant(false)?;
        if name.kind != TokenKind::Ident {
            return Err(self.error(&name, "expected package name"));
        }
        let package_name = self.text(&name).to_string();

        let after = self.next()?;
        let import_comment = if after.is_comment() && is_import_comment(self.text(&after)) {
            let text = self.text(&after);
            let cr = text.len() - text.trim_end_matches('\r').len();
            Some(name.span.end..after.span.end - cr)
        } else {
            None
        };
        self.push_back(after);

        let mut decls = Vec::new();
        loop {
            let tok = self.next_significant(true)?;
            match tok.kind {
                TokenKind::Punct(';') => continue,
                TokenKind::Ident if self.text(&tok) == "import" => {
                    decls.push(self.parse_decl(tok.span.start)?);
                }
                _ => break,
            }
        }

        Ok(ImportSection {
            package_name,
            import_comment,
            decls,
        })
    }

    fn parse_decl(&mut self, start: usize) -> Result<ImportDecl, SyntaxError> {
        let tok = self.next_significant(true)?;
        if tok.kind == TokenKind::Punct('(') {
            return self.parse_group(start, tok.span.end);
        }

        let spec = self.parse_spec(tok)?;
        Ok(ImportDecl {
            span: start..spec.literal.end,
            head: None,
            specs: vec![spec],
            entries: Vec::new(),
        })
    }

    fn parse_spec(&mut self, first: Token) -> Result<ImportSpec, SyntaxError> {
        let (name, comments, lit) = match first.kind {
            TokenKind::String => (None, Vec::new(), first),
            TokenKind::Ident | TokenKind::Punct('.') => {
                let mut comments = Vec::new();
                let lit = loop {
                    let tok = self.next()?;
                    if !tok.is_comment() {
                        break tok;
                    }
                    comments.push(tok.span);
                };
                (Some(self.text(&first).to_string()), comments, lit)
            }
            TokenKind::Eof => return Err(self.error(&first, "unexpected end of file in import")),
            _ => {
                return Err(self.error(
                    &first,
                    format!("unexpected {:?} in import declaration", self.text(&first)),
                ))
            }
        };

        if lit.kind != TokenKind::String {
            return Err(self.error(&lit, "expected import path"));
        }
        let path = unquote(self.text(&lit))
            .ok_or_else(|| self.error(&lit, "invalid import path literal"))?;
        if path.is_empty() {
            return Err(self.error(&lit, "empty import path"));
        }

        Ok(ImportSpec {
            name,
            path,
            literal: lit.span,
            comments,
        })
    }

    fn parse_group(&mut self, start: usize, head_end: usize) -> Result<ImportDecl, SyntaxError> {
        let mut specs = Vec::new();
        let mut entries = Vec::new();
        let mut line = 0;

        loop {
            let tok = self.next()?;
            match tok.kind {
                TokenKind::Newline => line += 1,
                TokenKind::Punct(';') => {}
                TokenKind::LineComment => entries.push(Entry {
                    kind: EntryKind::Comment(tok.span.clone()),
                    first_line: line,
                    last_line: line,
                }),
                TokenKind::BlockComment => {
                    let lines = self.text(&tok).matches('\n').count();
                    entries.push(Entry {
                        kind: EntryKind::Comment(tok.span.clone()),
                        first_line: line,
                        last_line: line + lines,
                    });
                    line += lines;
                }
                TokenKind::Punct(')') => {
                    return Ok(ImportDecl {
                        span: start..tok.span.end,
                        head: Some(start..head_end),
                        specs,
                        entries,
                    });
                }
                TokenKind::Eof => {
                    return Err(self.error(&tok, "import block not terminated"));
                }
                _ => {
                    let spec_start = tok.span.start;
                    let spec = self.parse_spec(tok)?;
                    let lines = self.src[spec_start..spec.literal.end].matches('\n').count();
                    entries.push(Entry {
                        kind: EntryKind::Spec(specs.len()),
                        first_line: line,
                        last_line: line + lines,
                    });
                    line += lines;
                    specs.push(spec);
                }
            }
        }
    }
}

/// Recognize `// import "path"` and `/* import "path" */`
fn is_import_comment(comment: &str) -> bool {
    static IMPORT_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"^(?://\s*import\s+("[^"`]+"|`[^"`]+`)\s*|/\*\s*import\s+("[^"`]+"|`[^"`]+`)\s*\*/)$"#)
            .unwrap()
    });
    IMPORT_COMMENT_RE.is_match(comment)
}

/// Parse the package clause and import declarations of a source file
pub fn parse_imports(src: &str) -> Result<ImportSection, SyntaxError> {
    Parser::new(src).parse()
}

/// A spec laid out for rendering, with the comments attached to it
struct Unit {
    spec: usize,
    doc: Vec<Range<usize>>,
    prefix: Vec<Range<usize>>,
    trailing: Vec<Range<usize>>,
}

impl Unit {
    fn has_comments(&self, decl: &ImportDecl) -> bool {
        !(self.doc.is_empty()
            && self.prefix.is_empty()
            && self.trailing.is_empty()
            && decl.specs[self.spec].comments.is_empty())
    }
}

#[derive(Default)]
struct Group {
    units: Vec<Unit>,
    trailer: Vec<Range<usize>>,
}

/// Split a grouped declaration into blank-line separated groups
fn layout(decl: &ImportDecl) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut current = Group::default();
    let mut pending: Vec<(Range<usize>, usize)> = Vec::new();
    let mut last_line: Option<usize> = None;
    // (unit index, line) of the most recent spec, for trailing comments
    let mut last_spec: Option<(usize, usize)> = None;

    for entry in &decl.entries {
        if let Some(prev) = last_line {
            if entry.first_line > prev + 1 {
                current.trailer.extend(pending.drain(..).map(|(r, _)| r));
                groups.push(std::mem::take(&mut current));
                last_spec = None;
            }
        }
        last_line = Some(entry.last_line);

        match &entry.kind {
            EntryKind::Comment(range) => match last_spec {
                Some((unit, line)) if line == entry.first_line && pending.is_empty() => {
                    current.units[unit].trailing.push(range.clone());
                }
                _ => pending.push((range.clone(), entry.last_line)),
            },
            EntryKind::Spec(spec) => {
                let (prefix, doc): (Vec<_>, Vec<_>) = pending
                    .drain(..)
                    .partition(|(_, line)| *line == entry.first_line);
                current.units.push(Unit {
                    spec: *spec,
                    doc: doc.into_iter().map(|(r, _)| r).collect(),
                    prefix: prefix.into_iter().map(|(r, _)| r).collect(),
                    trailing: Vec::new(),
                });
                last_spec = Some((current.units.len() - 1, entry.first_line));
            }
        }
    }

    current.trailer.extend(pending.into_iter().map(|(r, _)| r));
    if !current.units.is_empty() || !current.trailer.is_empty() {
        groups.push(current);
    }
    groups
}

/// Render a grouped declaration with the given literal text per spec
fn render_group(src: &str, decl: &ImportDecl, literals: &[String]) -> String {
    let head = decl.head.clone().unwrap_or(decl.span.start..decl.span.start);
    let eol = if src[decl.span.clone()].contains("\r\n") { "\r\n" } else { "\n" };
    let comment = |range: &Range<usize>| src[range.clone()].trim_end_matches('\r');

    let mut out = String::from(&src[head]);
    out.push_str(eol);

    let sort_key = |unit: &Unit| {
        let spec = &decl.specs[unit.spec];
        (unquote(&literals[unit.spec]).unwrap_or_default(), spec.name.clone())
    };

    for (i, mut group) in layout(decl).into_iter().enumerate() {
        if i > 0 {
            out.push_str(eol);
        }

        group.units.sort_by_cached_key(|u| sort_key(u));
        let mut previous: Option<(String, Option<String>)> = None;

        for unit in &group.units {
            let key = sort_key(unit);
            if previous.as_ref() == Some(&key) && !unit.has_comments(decl) {
                continue;
            }
            previous = Some(key);

            for doc in &unit.doc {
                out.push('\t');
                out.push_str(comment(doc));
                out.push_str(eol);
            }

            out.push('\t');
            for prefix in &unit.prefix {
                out.push_str(comment(prefix));
                out.push(' ');
            }
            let spec = &decl.specs[unit.spec];
            if let Some(name) = &spec.name {
                out.push_str(name);
                out.push(' ');
            }
            for inner in &spec.comments {
                out.push_str(comment(inner));
                out.push(' ');
            }
            out.push_str(&literals[unit.spec]);
            for trailing in &unit.trailing {
                out.push(' ');
                out.push_str(comment(trailing));
            }
            out.push_str(eol);
        }

        for trailer in &group.trailer {
            out.push('\t');
            out.push_str(comment(trailer));
            out.push_str(eol);
        }
    }

    out.push(')');
    out
}

/// Apply `translate` to every import and return the new source text
///
/// Returns `None` when nothing changes. Only declarations containing a
/// changed import are touched; all other bytes are copied verbatim.
pub fn rewrite_section<F>(
    src: &str,
    section: &ImportSection,
    translate: F,
    strip_import_comment: bool,
) -> Option<String>
where
    F: Fn(&str) -> String,
{
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    if strip_import_comment {
        if let Some(range) = &section.import_comment {
            edits.push((range.clone(), String::new()));
        }
    }

    for decl in &section.decls {
        let mut changed = false;
        let literals: Vec<String> = decl
            .specs
            .iter()
            .map(|spec| {
                let new_path = translate(&spec.path);
                if new_path == spec.path {
                    src[spec.literal.clone()].to_string()
                } else {
                    changed = true;
                    quote(&new_path)
                }
            })
            .collect();

        if !changed {
            continue;
        }

        if decl.is_grouped() {
            edits.push((decl.span.clone(), render_group(src, decl, &literals)));
        } else if let (Some(spec), Some(literal)) = (decl.specs.first(), literals.first()) {
            edits.push((spec.literal.clone(), literal.clone()));
        }
    }

    if edits.is_empty() {
        return None;
    }

    edits.sort_by_key(|(range, _)| range.start);
    let mut out = String::with_capacity(src.len() + 64);
    let mut cursor = 0;
    for (range, text) in edits {
        out.push_str(&src[cursor..range.start]);
        out.push_str(&text);
        cursor = range.end;
    }
    out.push_str(&src[cursor..]);
    Some(out)
}
