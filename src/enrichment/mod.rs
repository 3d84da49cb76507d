//! Asynchronous thought enrichment.
//!
//! - [`prompt`]: request composition and result extraction
//! - [`worker`]: one enrichment pass per thought, plus rerun-all
//! - [`scheduler`]: background execution with per-task status
//! - [`events`]: change feed consumed by live subscribers

pub mod events;
pub mod prompt;
pub mod scheduler;
pub mod worker;

pub use events::{ChangeFeed, ThoughtEvent, ThoughtEventKind};
pub use scheduler::{EnrichmentJob, TaskRecord, TaskScheduler, TaskStatus};
pub use worker::EnrichmentWorker;
