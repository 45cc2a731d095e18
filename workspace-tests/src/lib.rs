//! Shared helpers for the cross-crate tests

use anyhow::Context;
use std::path::{Path, PathBuf};

/// Root directory of the cargo workspace
pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".."))
}

/// Parse a Cargo manifest
pub fn read_manifest(path: &Path) -> anyhow::Result<toml::Table> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    content
        .parse::<toml::Table>()
        .with_context(|| format!("Failed to parse {}", path.display()))
}
