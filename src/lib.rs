//! graypipe: resumable concurrent image pipeline (decode → resize → grayscale → encode)

pub mod engine;
pub mod imaging;
pub mod ledger;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::Arc;

use crate::imaging::ImageOps;
use crate::ledger::{LedgerStore, filter_unseen};

/// Result alias used by public graypipe API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: process `inputs` in order, skipping any the ledger already lists, and
/// merge this run's successes into the ledger.
///
/// - The ledger is read once before the pipeline starts and written once after the last item
///   is collected; nothing touches it while stages run.
/// - Per-item failures (unreadable input, failed transform, failed write) never fail the call.
///   They are logged and reported in [`RunReport`], and retried on the next run.
/// - A ledger that cannot be read at merge time is left as is and
///   [`RunReport::ledger_total`] is `None`.
///
/// Errors only when a stage thread cannot be spawned or panics.
///
/// ```ignore
/// let ledger = graypipe::ledger::JsonFileLedger::new("results.json");
/// let ops = std::sync::Arc::new(graypipe::imaging::StandardOps);
/// let report = graypipe::process_batch(inputs, &Opts::default(), ops, &ledger)?;
/// ```
pub fn process_batch<L>(
    inputs: Vec<PathBuf>,
    opts: &Opts,
    ops: Arc<dyn ImageOps>,
    ledger: &L,
) -> Result<RunReport>
where
    L: LedgerStore + ?Sized,
{
    let seen = ledger.load_seen();
    let candidates = inputs.len();
    let pending = filter_unseen(inputs, &seen);
    let already_processed = candidates - pending.len();
    debug!(
        "{} candidate(s), {} already in ledger, {} pending",
        candidates,
        already_processed,
        pending.len()
    );

    let ((succeeded, failed), stats) = pipeline::process_pending(pending, seen, opts, ops)?;

    let ledger_total = match ledger.merge_and_persist(&succeeded) {
        Ok(total) => {
            info!(
                "Ledger updated: {} new, {} total",
                succeeded.len(),
                total
            );
            Some(total)
        }
        Err(e) => {
            error!("{e}; ledger left unchanged");
            None
        }
    };

    Ok(RunReport {
        succeeded,
        failed,
        already_processed,
        duplicates: stats.duplicates,
        decode_failures: stats.decode_failures,
        ledger_total,
    })
}

/// Inputs [`process_batch`] would hand to the pipeline: `inputs` minus what the ledger lists,
/// minus repeats, in order. Reads the ledger only.
pub fn plan_batch<L>(inputs: Vec<PathBuf>, ledger: &L) -> Vec<PathBuf>
where
    L: LedgerStore + ?Sized,
{
    let mut seen = ledger.load_seen();
    filter_unseen(inputs, &seen)
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
