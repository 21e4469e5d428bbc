//! Terminal stage: encode each healthy item to its output path.

use crossbeam_channel::{Receiver, Sender};
use log::warn;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::imaging::ImageOps;
use crate::utils::STAGE_THREAD_PREFIX;
use crate::utils::config::StageNames;
use crate::{ItemState, WorkItem};

fn persist_loop(ops: Arc<dyn ImageOps>, rx: Receiver<WorkItem>, tx: Sender<WorkItem>) {
    while let Ok(item) = rx.recv() {
        let output = item.output.clone();
        let item = item.apply(StageNames::WRITE, |image| {
            ops.encode(&image, &output).map(|()| ItemState::Persisted)
        });
        if let ItemState::Failed(f) = &item.state
            && f.stage == StageNames::WRITE
        {
            warn!("Error writing image: {}", f.error);
        }
        if tx.send(item).is_err() {
            break;
        }
    }
    drop(tx);
}

/// Spawn the persist stage. Every item is forwarded, written or not.
pub fn spawn_persist_stage(
    ops: Arc<dyn ImageOps>,
    rx: Receiver<WorkItem>,
    tx: Sender<WorkItem>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("{STAGE_THREAD_PREFIX}{}", StageNames::WRITE))
        .spawn(move || persist_loop(ops, rx, tx))
}
