//! Public and internal types for the graypipe API and pipeline.

use image::DynamicImage;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

use crate::imaging::ImageOpError;
use crate::pipeline::TransformKind;
use crate::utils::config::{DEFAULT_INPUT_DIR, OUTPUT_SUBDIR, PackagePaths, TargetSize};

/// Stage name → elapsed seconds for that stage's operation, in the order the stages ran.
pub type StageTimings = IndexMap<String, f64>;

/// Where a [`WorkItem`] stands as it moves down the chain.
pub enum ItemState {
    /// Decoded and healthy. The payload is owned by whichever stage holds the item.
    Ready(DynamicImage),
    /// Written to `output`; the payload has been released.
    Persisted,
    /// Some stage failed. Later stages forward the item without running their operation.
    Failed(StageFailure),
}

/// Which stage failed and why.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: String,
    pub error: ImageOpError,
}

/// One image travelling through the pipeline.
pub struct WorkItem {
    pub input: PathBuf,
    pub output: PathBuf,
    pub timings: StageTimings,
    pub state: ItemState,
}

impl WorkItem {
    pub fn new(input: PathBuf, output: PathBuf, image: DynamicImage) -> Self {
        Self {
            input,
            output,
            timings: StageTimings::new(),
            state: ItemState::Ready(image),
        }
    }

    /// Record `secs` for `stage`.
    pub fn record(&mut self, stage: &str, secs: f64) {
        self.timings.insert(stage.to_string(), secs);
    }

    /// Run `op` on the payload if the item is still `Ready`.
    ///
    /// On success the elapsed seconds land in `timings` under `stage` and the state becomes
    /// whatever `op` returned. On error the item is `Failed` and no timing is recorded.
    /// `Persisted` and `Failed` items come back untouched.
    pub fn apply<F>(mut self, stage: &str, op: F) -> Self
    where
        F: FnOnce(DynamicImage) -> Result<ItemState, ImageOpError>,
    {
        self.state = match self.state {
            ItemState::Ready(image) => {
                let start = Instant::now();
                match op(image) {
                    Ok(next) => {
                        self.timings
                            .insert(stage.to_string(), start.elapsed().as_secs_f64());
                        next
                    }
                    Err(error) => ItemState::Failed(StageFailure {
                        stage: stage.to_string(),
                        error,
                    }),
                }
            }
            other => other,
        };
        self
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self.state, ItemState::Persisted)
    }

    /// Failure message for the ledger / logs. `None` only for persisted items.
    pub fn error_message(&self) -> Option<String> {
        match &self.state {
            ItemState::Persisted => None,
            ItemState::Failed(f) => Some(format!("{}: {}", f.stage, f.error)),
            ItemState::Ready(_) => Some("pipeline ended before the image was written".to_string()),
        }
    }

    /// Summary without the payload.
    pub fn to_ledger_entry(&self) -> LedgerEntry {
        LedgerEntry {
            input_path: self.input.clone(),
            output_path: self.output.clone(),
            timings: self.timings.clone(),
            error: self.error_message(),
        }
    }
}

/// One record in the resume ledger. Never carries image data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    #[serde(default)]
    pub timings: StageTimings,
    #[serde(default)]
    pub error: Option<String>,
}

/// Outcome of [`process_batch`](crate::process_batch).
#[derive(Debug, Default)]
pub struct RunReport {
    /// Persisted items in the order they reached the collector.
    pub succeeded: Vec<LedgerEntry>,
    /// Items that failed after ingest (`error` set). Not written to the ledger.
    pub failed: Vec<LedgerEntry>,
    /// Inputs dropped because the ledger already lists them.
    pub already_processed: usize,
    /// Inputs repeated within this batch after a successful first decode.
    pub duplicates: usize,
    /// Inputs that could not be decoded; retried on the next run.
    pub decode_failures: usize,
    /// Ledger size after the merge, or `None` when the merge was aborted.
    pub ledger_total: Option<usize>,
}

/// Full options (CLI and lib).
#[derive(Clone, Debug)]
pub struct Opts {
    /// Directory listed for inputs (CLI only; lib callers pass inputs directly).
    pub input_dir: PathBuf,
    /// Output directory. When None, `<input_dir>/output`.
    pub output_dir: Option<PathBuf>,
    /// Resume ledger file.
    pub ledger_path: PathBuf,
    /// Resize target width.
    pub width: u32,
    /// Resize target height.
    pub height: u32,
    /// Gaussian blur after grayscale, when set.
    pub blur_sigma: Option<f32>,
    /// Counter-clockwise rotation in degrees after grayscale (and blur), when set.
    pub rotate_degrees: Option<f32>,
    /// Debug logging and progress bar.
    pub verbose: bool,
    /// List what would be processed; decode and write nothing.
    pub dry_run: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: None,
            ledger_path: PackagePaths::get().default_ledger_path(),
            width: TargetSize::WIDTH,
            height: TargetSize::HEIGHT,
            blur_sigma: None,
            rotate_degrees: None,
            verbose: false,
            dry_run: false,
        }
    }
}

impl Opts {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join(OUTPUT_SUBDIR))
    }

    /// Transform stages between ingest and persist, in chain order.
    pub fn transforms(&self) -> Vec<TransformKind> {
        let mut kinds = vec![
            TransformKind::Resize {
                width: self.width,
                height: self.height,
            },
            TransformKind::Grayscale,
        ];
        if let Some(sigma) = self.blur_sigma {
            kinds.push(TransformKind::Blur { sigma });
        }
        if let Some(degrees) = self.rotate_degrees {
            kinds.push(TransformKind::Rotate { degrees });
        }
        kinds
    }
}
