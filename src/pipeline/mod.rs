//! Pipeline components: context, stages, collector, orchestration.

pub mod collector;
pub mod context;
pub mod ingest;
pub mod orchestrator;
pub mod persist;
pub mod transform;

pub use collector::{CollectedResults, collect_results};
pub use context::{IngestContext, IngestStats, PipelineHandles, stage_channel};
pub use ingest::{run_ingest_loop, spawn_ingest_thread};
pub use orchestrator::{process_pending, run_pipeline, shutdown_pipeline_handles};
pub use persist::spawn_persist_stage;
pub use transform::{TransformKind, spawn_transform_stage};
