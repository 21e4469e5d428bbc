//! Transform stages: one image operation per stage, applied to every healthy item.

use crossbeam_channel::{Receiver, Sender};
use image::DynamicImage;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::imaging::{ImageOpError, ImageOps};
use crate::utils::STAGE_THREAD_PREFIX;
use crate::utils::config::StageNames;
use crate::{ItemState, WorkItem};

/// The operation a transform stage runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformKind {
    Resize { width: u32, height: u32 },
    Grayscale,
    Blur { sigma: f32 },
    Rotate { degrees: f32 },
}

impl TransformKind {
    /// Stage name used for the thread and the timing entry.
    pub fn name(&self) -> &'static str {
        match self {
            TransformKind::Resize { .. } => StageNames::RESIZE,
            TransformKind::Grayscale => StageNames::GRAYSCALE,
            TransformKind::Blur { .. } => StageNames::BLUR,
            TransformKind::Rotate { .. } => StageNames::ROTATE,
        }
    }

    pub fn apply(
        &self,
        ops: &dyn ImageOps,
        image: DynamicImage,
    ) -> Result<DynamicImage, ImageOpError> {
        match *self {
            TransformKind::Resize { width, height } => ops.resize(image, width, height),
            TransformKind::Grayscale => ops.grayscale(image),
            TransformKind::Blur { sigma } => ops.blur(image, sigma),
            TransformKind::Rotate { degrees } => ops.rotate(image, degrees),
        }
    }
}

/// Receive until upstream closes, transform, forward. Items that already failed pass through
/// without running the operation or gaining a timing entry.
fn transform_loop(
    kind: TransformKind,
    ops: Arc<dyn ImageOps>,
    rx: Receiver<WorkItem>,
    tx: Sender<WorkItem>,
) {
    while let Ok(item) = rx.recv() {
        let item = item.apply(kind.name(), |image| {
            kind.apply(ops.as_ref(), image).map(ItemState::Ready)
        });
        if let ItemState::Failed(f) = &item.state
            && f.stage == kind.name()
        {
            log::warn!("Error in {} for {}: {}", f.stage, item.input.display(), f.error);
        }
        if tx.send(item).is_err() {
            break;
        }
    }
    drop(tx);
}

pub fn spawn_transform_stage(
    kind: TransformKind,
    ops: Arc<dyn ImageOps>,
    rx: Receiver<WorkItem>,
    tx: Sender<WorkItem>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("{STAGE_THREAD_PREFIX}{}", kind.name()))
        .spawn(move || transform_loop(kind, ops, rx, tx))
}
