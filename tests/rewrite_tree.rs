// tests/rewrite_tree.rs

//! Tree-wide import rewriting

mod common;

use common::{go_source, write_file};
use hashvend::rewrite::PrefixMapper;
use hashvend::{RewriteEngine, RewriteOptions};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn mapper(pairs: &[(&str, &str)]) -> PrefixMapper {
    PrefixMapper::new(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn everything(_: &Path) -> bool {
    true
}

const MESSY: &str = r#"// Package svc does things.
package svc // import "example.com/svc"

import (
	"fmt"
	"github.com/x/y/sub" // the good one

	log "github.com/other/log"
)

// Run   keeps   its   odd   spacing
func Run() {  fmt.Println(sub.V, log.L)   }
"#;

#[test]
fn test_only_changed_files_are_touched() {
    let temp = TempDir::new().unwrap();
    let touched = write_file(temp.path(), "a/a.go", &go_source("a", &["github.com/x/y"]));
    let untouched = write_file(temp.path(), "b/b.go", &go_source("b", &["fmt", "github.com/q/r"]));
    let before = fs::metadata(&untouched).unwrap().modified().unwrap();

    let report = RewriteEngine::new(4)
        .rewrite_tree(temp.path(), &mapper(&[("github.com/x/y", "gx/ipfs/QmY/y")]), everything)
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.rewritten.len(), 1);
    assert!(report.rewritten[0].ends_with("a/a.go"));
    assert_eq!(report.unchanged, 1);
    assert_eq!(fs::read_to_string(&touched).unwrap(), go_source("a", &["gx/ipfs/QmY/y"]));
    assert_eq!(fs::metadata(&untouched).unwrap().modified().unwrap(), before);
}

#[test]
fn test_edit_is_confined_to_import_literal() {
    let temp = TempDir::new().unwrap();
    let file = write_file(temp.path(), "svc.go", MESSY);

    RewriteEngine::new(2)
        .rewrite_tree(temp.path(), &mapper(&[("github.com/x/y", "gx/ipfs/QmY/y")]), everything)
        .unwrap();

    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        MESSY.replace("github.com/x/y/sub", "gx/ipfs/QmY/y/sub")
    );
}

#[test]
fn test_second_run_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let file = write_file(temp.path(), "svc.go", MESSY);
    let engine = RewriteEngine::new(2);
    let map = mapper(&[("github.com/x/y", "gx/ipfs/QmY/y")]);

    let first = engine.rewrite_tree(temp.path(), &map, everything).unwrap();
    let after_first = fs::read_to_string(&file).unwrap();
    let second = engine.rewrite_tree(temp.path(), &map, everything).unwrap();

    assert_eq!(first.rewritten.len(), 1);
    assert!(second.rewritten.is_empty());
    assert_eq!(second.unchanged, 1);
    assert_eq!(fs::read_to_string(&file).unwrap(), after_first);
}

#[test]
fn test_forward_then_inverse_restores_bytes() {
    let temp = TempDir::new().unwrap();
    let original = go_source("main", &["fmt", "github.com/a/b/c", "github.com/d/e"]);
    let file = write_file(temp.path(), "cmd/main.go", &original);
    let engine = RewriteEngine::new(3);

    engine
        .rewrite_tree(
            temp.path(),
            &mapper(&[("github.com/a/b", "gx/ipfs/QmB/b"), ("github.com/d/e", "gx/ipfs/QmE/e")]),
            everything,
        )
        .unwrap();
    assert_ne!(fs::read_to_string(&file).unwrap(), original);

    engine
        .rewrite_tree(
            temp.path(),
            &mapper(&[("gx/ipfs/QmB/b", "github.com/a/b"), ("gx/ipfs/QmE/e", "github.com/d/e")]),
            everything,
        )
        .unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), original);
}

#[test]
fn test_bad_file_does_not_stop_the_run() {
    let temp = TempDir::new().unwrap();
    let good_a = write_file(temp.path(), "a.go", &go_source("p", &["github.com/x/y"]));
    let bad = write_file(temp.path(), "bad.go", "package p\n\nimport (\n\t\"github.com/x/y\"\n");
    let good_c = write_file(temp.path(), "c.go", &go_source("p", &["github.com/x/y/z"]));

    let report = RewriteEngine::new(2)
        .rewrite_tree(temp.path(), &mapper(&[("github.com/x/y", "gx/ipfs/QmY/y")]), everything)
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("bad.go"));
    assert_eq!(report.rewritten.len(), 2);
    assert!(fs::read_to_string(&good_a).unwrap().contains("gx/ipfs/QmY/y"));
    assert!(fs::read_to_string(&good_c).unwrap().contains("gx/ipfs/QmY/y/z"));
    assert_eq!(
        fs::read_to_string(&bad).unwrap(),
        "package p\n\nimport (\n\t\"github.com/x/y\"\n"
    );
}

#[test]
fn test_skipped_dirs_and_filter() {
    let temp = TempDir::new().unwrap();
    let src = go_source("p", &["github.com/x/y"]);
    write_file(temp.path(), "vendor/dep/dep.go", &src);
    write_file(temp.path(), ".git/hooks/h.go", &src);
    write_file(temp.path(), "_scratch.go", &src);
    write_file(temp.path(), "notes.txt", &src);
    write_file(temp.path(), "gen/generated.go", &src);
    let kept = write_file(temp.path(), "lib/lib.go", &src);

    let report = RewriteEngine::new(2)
        .rewrite_tree(
            temp.path(),
            &mapper(&[("github.com/x/y", "gx/ipfs/QmY/y")]),
            |rel: &Path| !rel.starts_with("gen"),
        )
        .unwrap();

    assert_eq!(report.rewritten.len(), 1);
    assert!(report.rewritten[0].ends_with("lib/lib.go"));
    assert!(fs::read_to_string(&kept).unwrap().contains("gx/ipfs/QmY/y"));
    assert_eq!(fs::read_to_string(temp.path().join("vendor/dep/dep.go")).unwrap(), src);
    assert_eq!(fs::read_to_string(temp.path().join("gen/generated.go")).unwrap(), src);
}

#[test]
fn test_closure_translator_with_bare_hash_prefix() {
    let temp = TempDir::new().unwrap();
    let file = write_file(
        temp.path(),
        "main.go",
        "package main\n\nimport \"github.com/x/y\"\n\nfunc main() { y.Go() }\n",
    );
    let translate = |path: &str| {
        if path == "github.com/x/y" {
            "H/y".to_string()
        } else {
            path.to_string()
        }
    };

    let report = RewriteEngine::new(1)
        .rewrite_tree(temp.path(), &translate, everything)
        .unwrap();

    assert_eq!(report.rewritten.len(), 1);
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "package main\n\nimport \"H/y\"\n\nfunc main() { y.Go() }\n"
    );
}

#[test]
fn test_strip_import_comments_option() {
    let temp = TempDir::new().unwrap();
    let file = write_file(
        temp.path(),
        "y.go",
        "package y // import \"github.com/x/y\"\n\nimport \"fmt\"\n\nvar _ = fmt.Sprint\n",
    );

    let report = RewriteEngine::new(1)
        .with_options(RewriteOptions {
            strip_import_comments: true,
        })
        .rewrite_tree(temp.path(), &mapper(&[]), everything)
        .unwrap();

    assert_eq!(report.rewritten.len(), 1);
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "package y\n\nimport \"fmt\"\n\nvar _ = fmt.Sprint\n"
    );
}

#[test]
fn test_missing_root_is_an_error() {
    let temp = TempDir::new().unwrap();
    let result = RewriteEngine::new(1).rewrite_tree(
        &temp.path().join("nope"),
        &mapper(&[]),
        everything,
    );
    assert!(result.is_err());
}

#[test]
fn test_crlf_file_keeps_line_endings() {
    let temp = TempDir::new().unwrap();
    let file = write_file(
        temp.path(),
        "win.go",
        "package win\r\n\r\nimport (\r\n\t\"fmt\" // f\r\n\tz /* zz */ \"github.com/x/y\"\r\n)\r\n\r\nfunc F() { fmt.Println(z.V) }\r\n",
    );

    let report = RewriteEngine::new(1)
        .rewrite_tree(temp.path(), &mapper(&[("github.com/x/y", "gx/ipfs/QmY/y")]), everything)
        .unwrap();

    assert_eq!(report.rewritten.len(), 1);
    let out = fs::read_to_string(&file).unwrap();
    assert_eq!(
        out,
        "package win\r\n\r\nimport (\r\n\t\"fmt\" // f\r\n\tz /* zz */ \"gx/ipfs/QmY/y\"\r\n)\r\n\r\nfunc F() { fmt.Println(z.V) }\r\n"
    );
    assert!(!out.replace("\r\n", "").contains('\n'));
}
