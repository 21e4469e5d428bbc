use clap::Parser;
use std::path::PathBuf;

use crate::utils::config::PackagePaths;

/// Resize, grayscale and re-encode a directory of images, skipping ones already in the ledger.
#[derive(Clone, Parser)]
#[command(name = "graypipe")]
#[command(about = "Process a directory of images; use --dry-run to list pending work.")]
pub struct Cli {
    /// Directory of input images. Default: `images` (or the settings file).
    #[arg(value_name = "INPUT_DIR")]
    pub dir: Option<PathBuf>,

    /// Output directory. Default: `output` inside INPUT_DIR.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Resume ledger file. Default: `results.json` in the working directory.
    #[arg(long, short)]
    pub ledger: Option<PathBuf>,

    /// Settings file. Default: `.graypipe.toml` in the working directory.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Resize target width.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Resize target height.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Add a Gaussian blur stage with this sigma after grayscale.
    #[arg(long, value_name = "SIGMA")]
    pub blur: Option<f32>,

    /// Add a rotation stage (degrees, counter-clockwise) after grayscale and blur.
    #[arg(long, value_name = "DEGREES", allow_negative_numbers = true)]
    pub rotate: Option<f32>,

    /// List the inputs that would be processed; decode and write nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

impl Cli {
    /// Settings file path, defaulting to the package settings filename in the working directory.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(PackagePaths::get().config_filename()))
    }
}
