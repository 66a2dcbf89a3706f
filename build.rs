use std::path::Path;
use std::process::Command;

/// Embeds `STNO_BUILD`, the `git describe` of the checkout, for `--version`.
/// Builds from a source tarball get an empty value.
fn main() {
    let git_dir = Path::new(".git");
    if !git_dir.exists() {
        println!("cargo:rustc-env=STNO_BUILD=");
        return;
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");

    let describe = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty=+"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    println!("cargo:rustc-env=STNO_BUILD={}", describe);
}
