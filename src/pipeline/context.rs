//! Pipeline context: what the ingest thread owns, the stage links, and the handles the
//! orchestrator joins.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::WorkItem;
use crate::engine::tools::OutputRule;
use crate::imaging::ImageOps;
use crate::ledger::SeenSet;
use crate::utils::config::HANDOFF_CHANNEL_CAP;

/// Everything the ingest thread needs. Moved into the thread; the seen-set is not shared.
pub struct IngestContext {
    /// Candidate inputs, already filtered against the ledger, in processing order.
    pub inputs: Vec<PathBuf>,
    /// Ledger inputs plus every input ingested so far in this run.
    pub seen: SeenSet,
    pub output_rule: OutputRule,
    pub ops: Arc<dyn ImageOps>,
}

/// Counts returned by the ingest thread when its inputs run out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub sent: usize,
    pub duplicates: usize,
    pub decode_failures: usize,
}

/// Handles returned by [`run_pipeline`](super::run_pipeline): receive finished items from
/// `result_rx`, then join the threads.
pub struct PipelineHandles {
    pub result_rx: Receiver<WorkItem>,
    pub ingest_handle: JoinHandle<IngestStats>,
    /// Transform and persist threads, in chain order, with their stage names.
    pub stage_handles: Vec<(&'static str, JoinHandle<()>)>,
}

/// One link between adjacent stages: exactly one sender and one receiver.
pub fn stage_channel() -> (Sender<WorkItem>, Receiver<WorkItem>) {
    bounded::<WorkItem>(HANDOFF_CHANNEL_CAP)
}
