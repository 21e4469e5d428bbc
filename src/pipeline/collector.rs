//! Drain the last stage and split outcomes.

use crossbeam_channel::Receiver;
use log::{info, warn};

use crate::engine::progress::{ProgressBar, update_progress_bar};
use crate::utils::Colors;
use crate::{LedgerEntry, WorkItem};

/// Result of [`collect_results`]: (succeeded, failed), both in arrival order.
pub type CollectedResults = (Vec<LedgerEntry>, Vec<LedgerEntry>);

/// Block until `result_rx` closes. One log line per item. Only `succeeded` is meant for the
/// ledger; failures are reported and forgotten so the next run retries them.
pub fn collect_results(
    result_rx: Receiver<WorkItem>,
    progress: Option<&ProgressBar>,
) -> CollectedResults {
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    while let Ok(item) = result_rx.recv() {
        let entry = item.to_ledger_entry();
        drop(item);
        match entry.error.as_deref() {
            None => {
                info!(
                    "{} {} -> {}",
                    Colors::colorize(Colors::SUCCESS, "Success!"),
                    entry.input_path.display(),
                    entry.output_path.display()
                );
                succeeded.push(entry);
            }
            Some(msg) => {
                warn!(
                    "{} {}: {}",
                    Colors::colorize(Colors::FAILURE, "Failed!"),
                    entry.input_path.display(),
                    msg
                );
                failed.push(entry);
            }
        }
        if let Some(bar) = progress {
            update_progress_bar(bar, 1);
        }
    }
    (succeeded, failed)
}
