//! Build script for shelfscore
//!
//! Embeds a build number and UTC timestamp. The number comes from
//! `SHELFSCORE_BUILD_NUMBER` when set (release pipelines pin it), otherwise
//! from a local counter in `build_number.txt` that advances per rebuild.

use std::fs;
use std::path::Path;

const COUNTER_FILE: &str = "build_number.txt";
const PINNED_VAR: &str = "SHELFSCORE_BUILD_NUMBER";

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed={}", PINNED_VAR);

    let build_number = match std::env::var(PINNED_VAR).ok().and_then(|v| v.trim().parse().ok()) {
        Some(pinned) => pinned,
        None => next_local_build(Path::new(COUNTER_FILE)),
    };

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=SHELFSCORE_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=SHELFSCORE_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:warning=shelfscore build #{} at {}", build_number, timestamp);
}

/// Bump the local counter. A read-only checkout still builds, with the
/// counter left where it was.
fn next_local_build(path: &Path) -> u64 {
    let current: u64 = fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    let next = current + 1;

    if let Err(e) = fs::write(path, next.to_string()) {
        println!("cargo:warning=could not update {}: {}", path.display(), e);
    }
    next
}
