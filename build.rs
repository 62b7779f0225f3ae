// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=TRANSMUTATION_VERSION");

    // Packagers building from a tarball set the version explicitly
    let version = std::env::var("TRANSMUTATION_VERSION").unwrap_or_else(|_| git_version());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// `0.1.0-abcdef1` at a tag, `0.1.0-dirty-abcdef1` past one, crate version otherwise
fn git_version() -> String {
    let fallback = env!("CARGO_PKG_VERSION").to_string();

    let Some(described) = git(&["describe", "--tags", "--always", "--match", "v*"]) else {
        return fallback;
    };
    let described = described.strip_prefix('v').unwrap_or(&described);

    // "0.1.0-5-gabcdef1": commits after a tag
    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    if let [hash, _commits, base] = parts.as_slice() {
        return format!("{}-dirty-{}", base, hash.trim_start_matches('g'));
    }

    match git(&["rev-parse", "--short", "HEAD"]) {
        // No tag at all, describe fell back to the bare hash
        Some(hash) if hash == described => format!("{}-{}", fallback, hash),
        Some(hash) => format!("{}-{}", described, hash),
        None => fallback,
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}
