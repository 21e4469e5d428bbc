use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;

/// Sibling temp path used while rewriting `path` (e.g. `results.json.tmp`).
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_else(|| PackagePaths::get().ledger_filename());
    path.parent()
        .unwrap_or(Path::new("."))
        .join(format!("{name}.tmp"))
}

/// Write `bytes` to a temp sibling, then rename over `final_path`.
/// A failed write leaves the previous file in place; the stale temp is removed.
pub fn write_atomically(final_path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let temp_path = temp_path_for(final_path);
    if let Err(e) = fs::write(&temp_path, bytes) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    fs::rename(&temp_path, final_path).inspect_err(|_| {
        let _ = fs::remove_file(&temp_path);
    })
}

/// Create the output directory (and parents) before the pipeline starts writing into it.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create output directory {}", dir.display()))
}
