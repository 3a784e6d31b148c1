//! Build script for pullbug - embeds version information.
//!
//! `BUILD_INFO_HUMAN` is composed of the crate version, the output of
//! `git describe --tags --always --dirty` (or a pseudo-version when the
//! checkout has no tags) and the rustc version. It is shown by
//! `pullbug --version`.

use std::{env, process::Command};

use chrono::Utc;

fn main() {
    for path in ["src", "build.rs", "Cargo.toml"] {
        println!("cargo:rerun-if-changed={path}");
    }

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", build_info());
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Tagged builds describe themselves; untagged ones get
/// `v{version}-{timestamp}-{commit}`.
fn git_version() -> String {
    match run("git", &["describe", "--tags", "--always", "--dirty"]) {
        Some(desc) if desc.starts_with('v') || desc.contains("-g") => desc,
        _ => {
            let commit = run("git", &["rev-parse", "--short=12", "HEAD"])
                .unwrap_or_else(|| "unknown".to_string());
            let timestamp = Utc::now().format("%Y%m%d%H%M%S");
            format!("v{}-{timestamp}-{commit}", env!("CARGO_PKG_VERSION"))
        }
    }
}

fn build_info() -> String {
    [
        Some(env!("CARGO_PKG_VERSION").to_string()),
        Some(format!("({})", git_version())),
        run("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}
