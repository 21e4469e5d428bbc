//! Pipeline tests: resume, ordering, failure isolation. Scripted image ops, in-memory ledger.

mod common;

use common::FakeOps;
use crossbeam_channel::{Receiver, Sender, bounded};
use graypipe::imaging::{ImageOpError, ImageOps};
use graypipe::ledger::{LedgerStore, MemoryLedger};
use graypipe::{LedgerEntry, Opts, RunReport, plan_batch, process_batch};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}

fn inputs(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(|n| p(&format!("images/{n}"))).collect()
}

fn output(name: &str) -> PathBuf {
    p(&format!("images/output/{name}"))
}

fn ledger_inputs(ledger: &MemoryLedger) -> Vec<PathBuf> {
    ledger
        .read_entries()
        .unwrap()
        .into_iter()
        .map(|e| e.input_path)
        .collect()
}

fn succeeded_inputs(report: &RunReport) -> Vec<PathBuf> {
    report.succeeded.iter().map(|e| e.input_path.clone()).collect()
}

fn run(ops: &Arc<FakeOps>, names: &[&str], ledger: &MemoryLedger) -> RunReport {
    process_batch(inputs(names), &Opts::default(), ops.clone(), ledger).unwrap()
}

fn abc_ops() -> Arc<FakeOps> {
    Arc::new(
        FakeOps::new()
            .with_source("images/a.jpg", 10, 20)
            .with_source("images/b.jpg", 30, 40)
            .with_source("images/c.jpg", 50, 60),
    )
}

fn entry(name: &str) -> LedgerEntry {
    LedgerEntry {
        input_path: p(&format!("images/{name}")),
        output_path: output(name),
        timings: [("read".to_string(), 0.5)].into_iter().collect(),
        error: None,
    }
}

// --- resume ---

#[test]
fn test_resume_processes_only_unseen_inputs() {
    let ledger = MemoryLedger::with_entries(&[entry("a.jpg"), entry("b.jpg")]).unwrap();
    let ops = abc_ops();

    let report = run(&ops, &["a.jpg", "b.jpg", "c.jpg"], &ledger);
    assert_eq!(succeeded_inputs(&report), inputs(&["c.jpg"]));
    assert_eq!(report.already_processed, 2);
    assert_eq!(ops.decoded(), inputs(&["c.jpg"]));
    assert_eq!(report.ledger_total, Some(3));

    let again = run(&ops, &["a.jpg", "b.jpg", "c.jpg"], &ledger);
    assert!(again.succeeded.is_empty());
    assert!(again.failed.is_empty());
    assert_eq!(again.already_processed, 3);
    assert_eq!(ops.decoded(), inputs(&["c.jpg"]), "second run must decode nothing");
    assert_eq!(ledger_inputs(&ledger), inputs(&["a.jpg", "b.jpg", "c.jpg"]));
}

#[test]
fn test_fresh_ledger_records_everything() {
    let ledger = MemoryLedger::new();
    let ops = abc_ops();
    let report = run(&ops, &["a.jpg", "b.jpg", "c.jpg"], &ledger);
    assert_eq!(report.succeeded.len(), 3);
    assert_eq!(ledger_inputs(&ledger), inputs(&["a.jpg", "b.jpg", "c.jpg"]));
}

#[test]
fn test_duplicate_in_batch_processed_once() {
    let ledger = MemoryLedger::new();
    let ops = abc_ops();
    let report = run(&ops, &["a.jpg", "b.jpg", "a.jpg"], &ledger);
    assert_eq!(succeeded_inputs(&report), inputs(&["a.jpg", "b.jpg"]));
    assert_eq!(report.duplicates, 1);
    assert_eq!(ops.decoded(), inputs(&["a.jpg", "b.jpg"]));
    assert_eq!(ledger_inputs(&ledger).len(), 2);
}

// --- ordering ---

#[test]
fn test_order_preserved_end_to_end() {
    let names: Vec<String> = (0..40).map(|i| format!("img{i:02}.png")).collect();
    let mut fake = FakeOps::new();
    for (i, n) in names.iter().enumerate() {
        // Varying sizes so stages take uneven time.
        let side = 8 + (i as u32 * 37) % 300;
        fake = fake.with_source(format!("images/{n}"), side, side / 2 + 1);
    }
    let ops = Arc::new(fake);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();

    let report = run(&ops, &refs, &MemoryLedger::new());
    let outputs: Vec<PathBuf> = report.succeeded.iter().map(|e| e.output_path.clone()).collect();
    let expected: Vec<PathBuf> = names.iter().map(|n| output(n)).collect();
    assert_eq!(outputs, expected);
    assert_eq!(ops.written(), expected);
}

/// Decoding `held` waits until some resize has started. A pipeline that finishes decoding
/// before resizing anything times out here and never sees the signal.
struct GatedOps {
    inner: FakeOps,
    held: PathBuf,
    resize_started: (Sender<()>, Receiver<()>),
    overlapped: AtomicBool,
}

impl ImageOps for GatedOps {
    fn decode(&self, path: &Path) -> Result<DynamicImage, ImageOpError> {
        if path == self.held {
            let signalled = self
                .resize_started
                .1
                .recv_timeout(Duration::from_secs(5))
                .is_ok();
            self.overlapped.store(signalled, Ordering::SeqCst);
        }
        self.inner.decode(path)
    }

    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), ImageOpError> {
        self.inner.encode(image, path)
    }

    fn resize(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, ImageOpError> {
        let _ = self.resize_started.0.try_send(());
        self.inner.resize(image, width, height)
    }

    fn grayscale(&self, image: DynamicImage) -> Result<DynamicImage, ImageOpError> {
        self.inner.grayscale(image)
    }

    fn blur(&self, image: DynamicImage, sigma: f32) -> Result<DynamicImage, ImageOpError> {
        self.inner.blur(image, sigma)
    }

    fn rotate(&self, image: DynamicImage, degrees: f32) -> Result<DynamicImage, ImageOpError> {
        self.inner.rotate(image, degrees)
    }
}

#[test]
fn test_first_item_resizes_while_second_decodes() {
    let ops = Arc::new(GatedOps {
        inner: FakeOps::new()
            .with_source("images/a.jpg", 10, 20)
            .with_source("images/b.jpg", 30, 40),
        held: p("images/b.jpg"),
        resize_started: bounded(1),
        overlapped: AtomicBool::new(false),
    });

    let report = process_batch(
        inputs(&["a.jpg", "b.jpg"]),
        &Opts::default(),
        ops.clone(),
        &MemoryLedger::new(),
    )
    .unwrap();
    assert_eq!(succeeded_inputs(&report), inputs(&["a.jpg", "b.jpg"]));
    assert!(
        ops.overlapped.load(Ordering::SeqCst),
        "a.jpg never reached resize while b.jpg was being decoded"
    );
}

// --- failures ---

#[test]
fn test_decode_failure_isolated_and_retried() {
    // b.jpg has no source: decode fails.
    let ops = Arc::new(
        FakeOps::new()
            .with_source("images/a.jpg", 10, 20)
            .with_source("images/c.jpg", 50, 60),
    );
    let ledger = MemoryLedger::new();

    let report = run(&ops, &["a.jpg", "b.jpg", "c.jpg"], &ledger);
    assert_eq!(succeeded_inputs(&report), inputs(&["a.jpg", "c.jpg"]));
    assert!(report.failed.is_empty(), "decode failures never enter the pipeline");
    assert_eq!(report.decode_failures, 1);
    assert_eq!(ledger_inputs(&ledger), inputs(&["a.jpg", "c.jpg"]));

    assert_eq!(plan_batch(inputs(&["a.jpg", "b.jpg", "c.jpg"]), &ledger), inputs(&["b.jpg"]));
    let again = run(&ops, &["a.jpg", "b.jpg", "c.jpg"], &ledger);
    assert_eq!(again.decode_failures, 1, "b.jpg is attempted again");
}

#[test]
fn test_transform_failure_skips_later_stages() {
    let ops = Arc::new(
        FakeOps::new()
            .with_source("images/a.jpg", 10, 20)
            .with_source("images/b.jpg", 31, 41)
            .with_source("images/c.jpg", 50, 60)
            .failing_resize("images/b.jpg"),
    );
    let ledger = MemoryLedger::new();

    let report = run(&ops, &["a.jpg", "b.jpg", "c.jpg"], &ledger);
    assert_eq!(succeeded_inputs(&report), inputs(&["a.jpg", "c.jpg"]));
    assert_eq!(report.failed.len(), 1);

    let failed = &report.failed[0];
    assert_eq!(failed.input_path, p("images/b.jpg"));
    assert!(failed.error.as_deref().unwrap().starts_with("resize:"));
    let stages: Vec<&str> = failed.timings.keys().map(String::as_str).collect();
    assert_eq!(stages, ["read"], "no timing for the failed stage or anything after it");

    assert_eq!(ops.grayscale_calls(), 2, "grayscale skipped for the failed item");
    assert!(!ops.written().contains(&output("b.jpg")));
    assert_eq!(ledger_inputs(&ledger), inputs(&["a.jpg", "c.jpg"]));
}

#[test]
fn test_encode_failure_not_persisted() {
    let ops = Arc::new(
        FakeOps::new()
            .with_source("images/a.jpg", 10, 20)
            .with_source("images/b.jpg", 30, 40)
            .failing_encode(output("a.jpg")),
    );
    let ledger = MemoryLedger::new();

    let report = run(&ops, &["a.jpg", "b.jpg"], &ledger);
    assert_eq!(succeeded_inputs(&report), inputs(&["b.jpg"]));
    let failed = &report.failed[0];
    assert!(failed.error.as_deref().unwrap().starts_with("write:"));
    assert!(!failed.timings.contains_key("write"));
    assert!(failed.timings.contains_key("grayscale"));
    assert_eq!(ledger_inputs(&ledger), inputs(&["b.jpg"]));
    assert_eq!(plan_batch(inputs(&["a.jpg", "b.jpg"]), &ledger), inputs(&["a.jpg"]));
}

// --- timings / payload ---

#[test]
fn test_timings_follow_stage_order() {
    let ledger = MemoryLedger::new();
    let report = run(&abc_ops(), &["a.jpg"], &ledger);
    let stages: Vec<&str> = report.succeeded[0]
        .timings
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(stages, ["read", "resize", "grayscale", "write"]);
    assert!(report.succeeded[0].timings.values().all(|s| *s >= 0.0));
}

#[test]
fn test_extra_stages_append_after_grayscale() {
    let opts = Opts {
        blur_sigma: Some(1.0),
        rotate_degrees: Some(90.0),
        width: 16,
        height: 16,
        ..Opts::default()
    };
    let ops = abc_ops();
    let report = process_batch(inputs(&["a.jpg"]), &opts, ops.clone(), &MemoryLedger::new()).unwrap();
    let stages: Vec<&str> = report.succeeded[0]
        .timings
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(stages, ["read", "resize", "grayscale", "blur", "rotate", "write"]);
    assert_eq!(ops.written_dims.lock().unwrap()[&output("a.jpg")], (16, 16));
}

#[test]
fn test_written_images_are_target_size() {
    let ops = abc_ops();
    run(&ops, &["a.jpg", "b.jpg", "c.jpg"], &MemoryLedger::new());
    let dims = ops.written_dims.lock().unwrap();
    assert_eq!(dims.len(), 3);
    assert!(dims.values().all(|d| *d == (500, 500)));
}

#[test]
fn test_ledger_text_has_no_payload() {
    let ledger = MemoryLedger::new();
    run(&abc_ops(), &["a.jpg"], &ledger);
    let text = String::from_utf8(ledger.contents().unwrap()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let record = value.as_array().unwrap()[0].as_object().unwrap();
    let mut keys: Vec<&str> = record.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, ["error", "input_path", "output_path", "timings"]);
}

// --- ledger failure handling ---

#[test]
fn test_corrupt_ledger_reprocesses_but_is_not_overwritten() {
    let ledger = MemoryLedger::with_contents("{ this is not json");
    let ops = abc_ops();

    let report = run(&ops, &["a.jpg", "b.jpg"], &ledger);
    assert_eq!(report.succeeded.len(), 2, "load fails open");
    assert_eq!(report.ledger_total, None, "merge fails closed");
    assert_eq!(ledger.contents().unwrap(), b"{ this is not json".to_vec());
}

#[test]
fn test_empty_batch_still_writes_ledger() {
    let ledger = MemoryLedger::new();
    let report = run(&abc_ops(), &[], &ledger);
    assert_eq!(report.ledger_total, Some(0));
    assert!(ledger.contents().is_some());
    assert!(ledger.read_entries().unwrap().is_empty());
}
