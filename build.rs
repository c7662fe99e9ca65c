// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .action(ArgAction::SetTrue)
        .help(help)
}

fn build_cli() -> Command {
    Command::new("hashvend")
        .version(env!("CARGO_PKG_VERSION"))
        .author("hashvend contributors")
        .about("Vendor Go dependencies into a content-addressed package store")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Show debug output"),
        )
        .subcommand(
            Command::new("import")
                .about("Publish a Go package and all of its dependencies")
                .arg(Arg::new("path").required(true).help("Import path to publish"))
                .arg(flag(
                    "rewrite",
                    "Rewrite each package's imports to vendored paths before publishing",
                ))
                .arg(flag("yesall", "Accept default package names without prompting"))
                .arg(
                    Arg::new("map")
                        .long("map")
                        .value_name("FILE")
                        .help("JSON document mapping import paths to already published hashes"),
                )
                .arg(flag("tmpdir", "Use a fresh temporary directory as the Go workspace")),
        )
        .subcommand(
            Command::new("rewrite")
                .visible_alias("rw")
                .about("Rewrite the current package's imports to vendored paths")
                .arg(
                    Arg::new("names")
                        .num_args(0..)
                        .help("Only rewrite dependencies with these package names"),
                )
                .arg(flag("undo", "Rewrite vendored paths back to their origin import paths"))
                .arg(flag("dry-run", "Print the rewrite map without touching any files"))
                .arg(
                    Arg::new("pkgdir")
                        .long("pkgdir")
                        .value_name("DIR")
                        .help("Alternative location of the vendored dependency directory"),
                )
                .arg(flag("fix", "Error-tolerant undo using descriptors in the global cache"))
                .arg(flag(
                    "strip-import-comments",
                    "Remove `// import \"...\"` comments from rewritten files",
                )),
        )
        .subcommand(
            Command::new("dep-map")
                .about("Print a JSON map of origin import paths to hashes for `import --map`"),
        )
        .subcommand(
            Command::new("update")
                .about("Replace one import path with another throughout the current tree")
                .arg(Arg::new("old").required(true).help("Import path to replace"))
                .arg(Arg::new("new").required(true).help("Replacement import path")),
        )
        .subcommand(Command::new("path").about("Print the origin import path of the current package"))
        .subcommand(
            Command::new("dvcs-deps")
                .about("List the external repositories the current package imports"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("hashvend.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
