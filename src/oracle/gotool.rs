// src/oracle/gotool.rs

//! `PathOracle` backed by the `go` command in GOPATH mode

use super::{DirectImports, ImportClass, PathOracle, Resolved};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Subset of `go list -json` output we use
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedPackage {
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default)]
    test_imports: Vec<String>,
    #[serde(default)]
    x_test_imports: Vec<String>,
    #[serde(default)]
    error: Option<ListError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListError {
    err: String,
}

/// Runs `go get -d` and `go list -e -json` against a GOPATH
pub struct GoTool {
    go: PathBuf,
    gopath: PathBuf,
}

impl GoTool {
    /// Locate `go` on `PATH`
    pub fn new(gopath: impl Into<PathBuf>) -> Result<Self> {
        let go = which::which("go")
            .map_err(|e| Error::Config(format!("go command not found: {}", e)))?;
        Ok(Self::with_binary(go, gopath))
    }

    /// Use a specific `go` binary
    pub fn with_binary(go: impl Into<PathBuf>, gopath: impl Into<PathBuf>) -> Self {
        Self {
            go: go.into(),
            gopath: gopath.into(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.go);
        cmd.env("GOPATH", &self.gopath).env("GO111MODULE", "off");
        cmd
    }

    fn source_dir(&self, import_path: &str) -> PathBuf {
        import_path
            .split('/')
            .fold(self.gopath.join("src"), |dir, seg| dir.join(seg))
    }
}

fn parse_list_output(stdout: &[u8]) -> Result<DirectImports> {
    let listed: ListedPackage = serde_json::from_slice(stdout)?;
    let class = match &listed.error {
        Some(err) => ImportClass::from_message(&err.err),
        None => ImportClass::Ok,
    };
    let imports: BTreeSet<String> = listed
        .imports
        .into_iter()
        .chain(listed.test_imports)
        .chain(listed.x_test_imports)
        .collect();
    Ok(DirectImports { imports, class })
}

fn tool_error(tool: &Path, message: impl Into<String>) -> Error {
    Error::Tool {
        tool: tool.display().to_string(),
        message: message.into(),
    }
}

impl PathOracle for GoTool {
    fn resolve(&self, import_path: &str) -> Result<Resolved> {
        debug!("go get -d {}", import_path);
        let output = self
            .command()
            .args(["get", "-d", import_path])
            .output()
            .map_err(|e| tool_error(&self.go, format!("failed to run: {}", e)))?;

        let dir = self.source_dir(import_path);
        if output.status.success() {
            return Ok(Resolved {
                dir,
                class: ImportClass::Ok,
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("cannot find package") || stderr.contains("unrecognized import path") {
            return Err(Error::NotFound(import_path.to_string()));
        }
        match ImportClass::from_message(&stderr) {
            ImportClass::Other(message) => Err(tool_error(
                &self.go,
                format!("go get {}: {}", import_path, message),
            )),
            class => Ok(Resolved { dir, class }),
        }
    }

    fn direct_imports(&self, import_path: &str) -> Result<DirectImports> {
        debug!("go list {}", import_path);
        let output = self
            .command()
            .args(["list", "-e", "-json", import_path])
            .output()
            .map_err(|e| tool_error(&self.go, format!("failed to run: {}", e)))?;

        if !output.status.success() {
            return Err(tool_error(
                &self.go,
                format!(
                    "go list {}: {}",
                    import_path,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        parse_list_output(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_output() {
        let json = br#"{
            "Dir": "/go/src/github.com/x/y",
            "ImportPath": "github.com/x/y",
            "Imports": ["fmt", "github.com/a/b"],
            "TestImports": ["testing", "github.com/a/b"],
            "XTestImports": ["github.com/c/d"]
        }"#;
        let listed = parse_list_output(json).unwrap();
        assert_eq!(listed.class, ImportClass::Ok);
        assert_eq!(
            listed.imports.into_iter().collect::<Vec<_>>(),
            vec!["fmt", "github.com/a/b", "github.com/c/d", "testing"]
        );
    }

    #[test]
    fn test_parse_list_error() {
        let json = br#"{
            "ImportPath": "github.com/x/y/docs",
            "Error": { "Err": "no Go files in /go/src/github.com/x/y/docs" }
        }"#;
        let listed = parse_list_output(json).unwrap();
        assert_eq!(listed.class, ImportClass::NoSourceFiles);
        assert!(listed.imports.is_empty());
    }

    #[test]
    fn test_source_dir() {
        let tool = GoTool::with_binary("/usr/bin/go", "/home/dev/go");
        assert_eq!(
            tool.source_dir("github.com/x/y"),
            PathBuf::from("/home/dev/go/src/github.com/x/y")
        );
    }
}
