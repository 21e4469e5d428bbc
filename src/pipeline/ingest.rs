//! Source stage: decode each unseen input into a [`WorkItem`] and send it down the chain.

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::WorkItem;
use crate::utils::{Colors, STAGE_THREAD_PREFIX};
use crate::utils::config::StageNames;

use super::context::{IngestContext, IngestStats};

pub fn spawn_ingest_thread(
    tx: Sender<WorkItem>,
    ctx: IngestContext,
) -> io::Result<JoinHandle<IngestStats>> {
    thread::Builder::new()
        .name(format!("{STAGE_THREAD_PREFIX}{}", StageNames::READ))
        .spawn(move || run_ingest_loop(tx, ctx))
}

/// Walk `ctx.inputs` in order. Seen inputs are skipped; decode failures are logged and
/// dropped without entering the pipeline (and without being marked seen, so the next run
/// tries them again). Drops `tx` when done, which closes the chain behind it.
pub fn run_ingest_loop(tx: Sender<WorkItem>, ctx: IngestContext) -> IngestStats {
    let IngestContext {
        inputs,
        mut seen,
        output_rule,
        ops,
    } = ctx;
    let mut stats = IngestStats::default();

    for path in inputs {
        if seen.contains(&path) {
            info!(
                "{} {} already processed",
                Colors::colorize(Colors::SKIPPED, "Skipped!"),
                path.display()
            );
            stats.duplicates += 1;
            continue;
        }
        let start = Instant::now();
        let image = match ops.decode(&path) {
            Ok(image) => image,
            Err(e) => {
                warn!("Error reading image: {e}");
                stats.decode_failures += 1;
                continue;
            }
        };
        let output = output_rule.output_for(&path);
        let mut item = WorkItem::new(path.clone(), output, image);
        item.record(StageNames::READ, start.elapsed().as_secs_f64());
        seen.insert(path);

        if tx.send(item).is_err() {
            break;
        }
        stats.sent += 1;
    }
    debug!(
        "ingest done: {} sent, {} duplicates, {} unreadable",
        stats.sent, stats.duplicates, stats.decode_failures
    );
    drop(tx);
    stats
}
