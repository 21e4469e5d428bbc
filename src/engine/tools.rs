//! Path and listing utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Check if a file should be excluded based on OS-specific hidden files
pub fn is_os_hidden_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        match name {
            // macOS
            ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
            // Windows
            "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" => true,
            // Linux
            ".directory" => true,
            // macOS resource fork files start with ._
            _ => name.starts_with("._"),
        }
    } else {
        false
    }
}

/// List the files directly inside `dir` (no recursion), sorted by name.
/// Subdirectories (including the default output directory) and OS hidden files are skipped.
/// Failing to read the directory is fatal for a run.
pub fn list_input_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir =
        std::fs::read_dir(dir).with_context(|| format!("list input directory {}", dir.display()))?;
    let mut paths = Vec::new();
    for entry in read_dir {
        let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", entry.path().display()))?;
        if file_type.is_dir() {
            continue;
        }
        let path = entry.path();
        if !is_os_hidden_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Maps an input path to its output path: the path relative to `input_dir`, re-rooted under
/// `output_dir`. Inputs outside `input_dir` keep only their file name.
#[derive(Clone, Debug)]
pub struct OutputRule {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl OutputRule {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_for(&self, input: &Path) -> PathBuf {
        match path_relative_to(input, &self.input_dir) {
            Some(rel) if !rel.as_os_str().is_empty() => self.output_dir.join(rel),
            _ => self
                .output_dir
                .join(input.file_name().unwrap_or(input.as_os_str())),
        }
    }
}
