use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::Opts;
use crate::engine::progress::{ProgressBar, create_progress_bar, set_bar_total};
use crate::engine::tools::OutputRule;
use crate::imaging::ImageOps;
use crate::ledger::SeenSet;
use crate::pipeline;

use super::collector::CollectedResults;
use super::context::{IngestContext, IngestStats, PipelineHandles};
use super::ingest::spawn_ingest_thread;
use super::persist::spawn_persist_stage;
use super::transform::spawn_transform_stage;

/// Start ingest → transforms → persist, one thread per stage. Returns the receiver of the
/// last link and the thread handles; caller drains `result_rx`, then joins.
pub fn run_pipeline(
    inputs: Vec<PathBuf>,
    seen: SeenSet,
    opts: &Opts,
    ops: Arc<dyn ImageOps>,
) -> Result<PipelineHandles> {
    let ctx = IngestContext {
        inputs,
        seen,
        output_rule: OutputRule::new(&opts.input_dir, opts.output_dir()),
        ops: Arc::clone(&ops),
    };

    let (ingest_tx, mut upstream) = pipeline::stage_channel();
    let ingest_handle = spawn_ingest_thread(ingest_tx, ctx).context("spawn ingest stage")?;

    let mut stage_handles = Vec::new();
    for kind in opts.transforms() {
        let (tx, rx) = pipeline::stage_channel();
        let handle = spawn_transform_stage(kind, Arc::clone(&ops), upstream, tx)
            .with_context(|| format!("spawn {} stage", kind.name()))?;
        stage_handles.push((kind.name(), handle));
        upstream = rx;
    }

    let (persist_tx, result_rx) = pipeline::stage_channel();
    let handle = spawn_persist_stage(ops, upstream, persist_tx).context("spawn write stage")?;
    stage_handles.push((crate::utils::StageNames::WRITE, handle));

    debug!(
        "pipeline: {}",
        std::iter::once(crate::utils::StageNames::READ)
            .chain(stage_handles.iter().map(|(name, _)| *name))
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    Ok(PipelineHandles {
        result_rx,
        ingest_handle,
        stage_handles,
    })
}

/// Shut down the pipeline by joining ingest and stage threads (after the stream is drained).
pub fn shutdown_pipeline_handles(
    ingest_handle: JoinHandle<IngestStats>,
    stage_handles: Vec<(&'static str, JoinHandle<()>)>,
) -> Result<IngestStats> {
    let stats = ingest_handle
        .join()
        .map_err(|_| anyhow::anyhow!("ingest thread panicked"))?;
    for (name, h) in stage_handles {
        h.join()
            .map_err(|_| anyhow::anyhow!("{name} stage thread panicked"))?;
    }
    Ok(stats)
}

/// Main orchestrator: run `inputs` through the whole chain and collect every outcome.
/// Ingest → transform stages → persist → collector.
pub fn process_pending(
    inputs: Vec<PathBuf>,
    seen: SeenSet,
    opts: &Opts,
    ops: Arc<dyn ImageOps>,
) -> Result<(CollectedResults, IngestStats)> {
    let progress: Option<ProgressBar> = opts
        .verbose
        .then(|| create_progress_bar(inputs.len(), "Processing"));

    let PipelineHandles {
        result_rx,
        ingest_handle,
        stage_handles,
    } = run_pipeline(inputs, seen, opts, ops)?;

    let collected = pipeline::collect_results(result_rx, progress.as_ref());
    debug!(
        "collector: channel closed, {} succeeded, {} failed",
        collected.0.len(),
        collected.1.len()
    );

    let stats = shutdown_pipeline_handles(ingest_handle, stage_handles)?;
    if let Some(bar) = progress.as_ref() {
        set_bar_total(bar, stats.sent);
    }
    Ok((collected, stats))
}
