// src/prompt.rs

//! Naming prompts for newly initialized packages

use crate::error::Result;
use std::io::{self, BufRead, Write};

/// Decides the name of a package that has no descriptor yet
pub trait NamePrompt {
    /// Return the name to use for `import_path`, given a suggested default
    fn package_name(&mut self, import_path: &str, default: &str) -> Result<String>;
}

/// Accepts every suggested name without asking
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl NamePrompt for AutoConfirm {
    fn package_name(&mut self, _import_path: &str, default: &str) -> Result<String> {
        Ok(default.to_string())
    }
}

/// Asks on a line-oriented stream; an empty answer keeps the default
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr, read answers from stdin
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> NamePrompt for LinePrompt<R, W> {
    fn package_name(&mut self, import_path: &str, default: &str) -> Result<String> {
        write!(
            self.output,
            "enter name for import '{}' [default: {}]: ",
            import_path, default
        )?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let answer = line.trim();
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer.to_string())
        }
    }
}
