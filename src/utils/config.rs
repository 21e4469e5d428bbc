//! Application configuration constants.
//! Defaults, stage names and channel sizing in one place.

use std::path::PathBuf;
use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived paths: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    ledger_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache paths from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
                ledger_filename: "results.json".to_string(),
            }
        })
    }

    /// Settings file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    pub fn ledger_filename(&self) -> &str {
        &self.ledger_filename
    }

    pub fn default_ledger_path(&self) -> PathBuf {
        PathBuf::from(&self.ledger_filename)
    }
}

// ---- Directories ----

/// Input directory used when neither the CLI nor the settings file names one.
pub const DEFAULT_INPUT_DIR: &str = "images";

/// Output directory name, created under the input directory by default.
pub const OUTPUT_SUBDIR: &str = "output";

// ---- Image geometry ----

/// Fixed resize target. Aspect ratio is not preserved.
pub struct TargetSize;

impl TargetSize {
    pub const WIDTH: u32 = 500;
    pub const HEIGHT: u32 = 500;
}

// ---- Stages ----

/// Names recorded in each item's timing trail and in the ledger.
pub struct StageNames;

impl StageNames {
    pub const READ: &'static str = "read";
    pub const RESIZE: &'static str = "resize";
    pub const GRAYSCALE: &'static str = "grayscale";
    pub const BLUR: &'static str = "blur";
    pub const ROTATE: &'static str = "rotate";
    pub const WRITE: &'static str = "write";
}

// ---- Channels ----

/// Capacity of every stage-to-stage channel. Zero makes each link a rendezvous handoff:
/// a send blocks until the next stage is ready to receive.
pub const HANDOFF_CHANNEL_CAP: usize = 0;
