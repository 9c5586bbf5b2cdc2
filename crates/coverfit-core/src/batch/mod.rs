//! Batch orchestration over a directory tree.
//!
//! - **controller**: run state machine and cooperative cancellation
//! - **events**: events emitted to the presentation layer and the sink trait
//! - **runner**: discovery + sequential per-file pipeline + progress

pub mod controller;
pub mod events;
pub mod runner;

pub use controller::{RunController, RunGuard};
pub use events::{BatchEvent, EventSink};
pub use runner::BatchRunner;
