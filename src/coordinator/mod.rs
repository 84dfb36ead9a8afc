//! Scheduler core modules.

mod backoff;
mod command;
mod core;
mod registry;
mod worker;

pub use backoff::pause_or_yield;
pub use registry::StreamId;
pub use self::core::{Coordinator, WorkerState};
