//! CPU-hosted execution coordinator emulating accelerator streams and events.
//!
//! This crate schedules GPU-style asynchronous work queues ("streams") and
//! completion handles ("events") on ordinary host threads. Client code
//! enqueues units of work onto named streams; a single background worker
//! notices pending work, drains every stream in parallel, and signals the
//! attached completion handles.
//!
//! # Architecture
//!
//! - **Coordinator**: owns the control queue, the stream registry, the
//!   default stream, and the worker thread; exposes stream lifecycle, work
//!   submission, and global synchronization
//! - **Stream**: thread-safe FIFO queue of pending tasks
//! - **Task**: opaque callable paired with a completion promise
//! - **Event**: caller-owned handle collecting completion futures and a
//!   last-update timestamp
//! - **Promise / SignalFuture**: one-shot blocking completion channel
//!
//! Administrative changes (stream creation/destruction, barriers, shutdown)
//! travel through a privileged control queue executed only by the worker
//! thread, strictly FIFO and never interleaved with a drain; that discipline
//! is what makes concurrent structural mutation of the stream collection
//! safe. When idle, the worker backs off for a bounded, randomized number of
//! relaxation steps instead of spinning hot or blocking unboundedly.

mod coordinator;
mod error;
mod event;
mod signal;
mod stream;
mod task;

pub use coordinator::{Coordinator, StreamId, WorkerState, pause_or_yield};
pub use error::{CoordinatorError, Status, last_error, set_last_error};
pub use event::{Event, add_done_signal, mark_as_all_synchronising, update_timestamp};
pub use signal::{Promise, SignalFuture};
pub use stream::Stream;
pub use task::Task;
