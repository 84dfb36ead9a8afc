//! Unit of work executed by the coordinator.
//!
//! A task wraps an opaque callable together with a completion promise. The
//! callable receives a single out-flag it may set to request that the worker
//! thread shut down after the current drain finishes ("poison"); ordinary
//! work leaves the flag untouched. When the callable returns, the task's
//! promise is fulfilled, so a caller that observed the completion future
//! resolve is guaranteed the work ran to completion first — including any
//! event-timestamp update the callable performed.

use crate::signal::{Promise, SignalFuture};

/// A single unit of queued work.
///
/// Tasks are owned by the stream that holds them until a drain extracts and
/// executes them, strictly in submission order within a stream.
pub struct Task {
    callable: Box<dyn FnOnce(&mut bool) + Send + 'static>,
    promise: Promise<()>,
}

impl Task {
    /// Wraps a callable as a task.
    ///
    /// # Arguments
    /// * `callable` - The work to run; may set its out-flag to request worker
    ///   shutdown once the surrounding drain completes
    pub fn new<F>(callable: F) -> Self
    where
        F: FnOnce(&mut bool) + Send + 'static,
    {
        Self {
            callable: Box::new(callable),
            promise: Promise::new(),
        }
    }

    /// Returns a future that resolves after the callable has run.
    pub fn future(&self) -> SignalFuture<()> {
        self.promise.future()
    }

    /// Executes the callable and fulfils the completion promise.
    ///
    /// The promise is fulfilled strictly after the callable returns.
    pub(crate) fn run(self, request_shutdown: &mut bool) {
        (self.callable)(request_shutdown);
        self.promise.fulfil(());
    }
}
