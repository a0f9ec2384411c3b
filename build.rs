//! Stamps the binary with its build time and git commit
//!
//! Both values reach `core::version` through `cargo:rustc-env`.

use chrono::Utc;
use std::process::Command;

fn short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty())
}

fn main() {
    let built = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let commit = short_commit().unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=PLUGCALC_BUILD_TIME={}", built);
    println!("cargo:rustc-env=PLUGCALC_GIT_HASH={}", commit);
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
