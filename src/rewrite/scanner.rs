// src/rewrite/scanner.rs

//! Tokenizer for the head of a Go source file
//!
//! Tokens are produced on demand so callers can stop as soon as they reach
//! the first declaration that is not an import. Only the token classes that
//! can appear in the package clause and import declarations are
//! distinguished; everything else is `Punct`.

use std::ops::Range;

/// Token classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword
    Ident,
    /// Interpreted (`"..."`) or raw (`` `...` ``) string literal
    String,
    /// `// ...` up to, not including, the newline
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// `\n`
    Newline,
    /// Any other single character
    Punct(char),
    /// End of input
    Eof,
}

/// A token and its byte span in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.span.clone()]
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

/// Scan failure with the byte offset it happened at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub offset: usize,
    pub message: String,
}

/// Lazy tokenizer over a source string
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        // A UTF-8 byte order mark is permitted at the very start
        let pos = if src.starts_with('\u{feff}') { 3 } else { 0 };
        Self { src, pos }
    }

    /// Byte offset of the next unread character
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            offset,
            message: message.into(),
        }
    }

    /// Produce the next token, skipping spaces, tabs, and carriage returns
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
            self.bump();
        }

        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: start..start,
            });
        };

        let kind = match c {
            '\n' => {
                self.bump();
                TokenKind::Newline
            }
            '/' if self.peek_second() == Some('/') => {
                while !matches!(self.peek(), None | Some('\n')) {
                    self.bump();
                }
                TokenKind::LineComment
            }
            '/' if self.peek_second() == Some('*') => {
                match self.src[self.pos + 2..].find("*/") {
                    Some(end) => self.pos += 2 + end + 2,
                    None => return Err(self.error(start, "comment not terminated")),
                }
                TokenKind::BlockComment
            }
            '"' => {
                self.bump();
                loop {
                    match self.bump() {
                        Some('"') => break,
                        Some('\\') => {
                            self.bump();
                        }
                        Some('\n') | None => {
                            return Err(self.error(start, "string literal not terminated"));
                        }
                        Some(_) => {}
                    }
                }
                TokenKind::String
            }
            '`' => {
                self.bump();
                match self.src[self.pos..].find('`') {
                    Some(end) => self.pos += end + 1,
                    None => return Err(self.error(start, "raw string literal not terminated")),
                }
                TokenKind::String
            }
            c if c == '_' || c.is_alphabetic() => {
                while matches!(self.peek(), Some(c) if c == '_' || c.is_alphanumeric()) {
                    self.bump();
                }
                TokenKind::Ident
            }
            c => {
                self.bump();
                TokenKind::Punct(c)
            }
        };

        Ok(Token {
            kind,
            span: start..self.pos,
        })
    }
}

/// Decode a Go string literal
pub fn unquote(lit: &str) -> Option<String> {
    if let Some(raw) = lit.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return Some(raw.replace('\r', ""));
    }

    let body = lit.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let decoded = match chars.next()? {
            'a' => '\u{7}',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{b}',
            '\\' => '\\',
            '"' => '"',
            'x' => hex_escape(&mut chars, 2)?,
            'u' => hex_escape(&mut chars, 4)?,
            'U' => hex_escape(&mut chars, 8)?,
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                char::from_u32(value)?
            }
            _ => return None,
        };
        out.push(decoded);
    }
    Some(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(value)
}

/// Encode a string as an interpreted Go string literal
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() && (c as u32) < 0x80 => {
                out.push_str(&format!("\\x{:02x}", c as u32))
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
