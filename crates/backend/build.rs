use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Copies the workspace `config.toml` next to the built binary so the
/// backend picks it up at runtime.
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let Some(target_dir) = profile_dir() else {
        println!("cargo:warning=could not locate the target profile directory");
        return;
    };

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(workspace_root) = manifest_dir.ancestors().nth(2) else {
        return;
    };

    let source = workspace_root.join("config.toml");
    if !source.exists() {
        println!("cargo:warning=config.toml not found at {:?}, the embedded default applies", source);
        return;
    }

    let dest = target_dir.join("config.toml");
    if let Err(e) = fs::copy(&source, &dest) {
        panic!("failed to copy config.toml to {:?}: {}", dest, e);
    }
}

// OUT_DIR looks like target/<profile>/build/<pkg>-<hash>/out
fn profile_dir() -> Option<PathBuf> {
    let out_dir = env::var("OUT_DIR").ok()?;
    let profile = env::var("PROFILE").ok()?;
    Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
}
