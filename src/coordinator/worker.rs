//! The scheduler state machine driven by the single worker thread.
//!
//! Each iteration runs: control-drain → idle-check → backoff or barrier
//! drain. Control commands execute strictly one at a time in FIFO order on
//! this thread and are never interleaved with a barrier drain, so registry
//! mutation (create/destroy) can never overlap registry iteration (drain).
//! The loop exits through the terminal sequence when a shutdown command
//! arrives or a drained task sets its poison flag.

use crate::coordinator::backoff;
use crate::coordinator::command::Command;
use crate::coordinator::core::{Shared, WorkerState};
use crate::signal::Promise;
use crate::stream::Stream;
use crate::task::Task;

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

/// Body of the worker thread.
pub(crate) fn run(shared: Arc<Shared>) {
    info!("worker thread started");

    let mut rng = rand::rng();

    loop {
        let mut batch = shared.control.take_all();
        while let Some(command) = batch.pop_front() {
            match command {
                Command::CreateStream(promise) => {
                    let stream = Arc::new(Stream::new());
                    let id = shared.streams.lock().unwrap().insert(stream);
                    debug!(stream = ?id, "created stream");
                    promise.fulfil(id);
                }
                Command::DestroyStream(id, promise) => {
                    match shared.streams.lock().unwrap().remove(id) {
                        Some(_) => debug!(stream = ?id, "destroyed stream"),
                        None => warn!(stream = ?id, "destroy of unknown stream ignored"),
                    }
                    promise.fulfil(());
                }
                Command::Barrier(promise) => {
                    let poisoned = barrier_drain(&shared);
                    promise.fulfil(());

                    if poisoned {
                        return terminate(&shared, batch, None);
                    }
                }
                Command::Shutdown(promise) => {
                    return terminate(&shared, batch, Some(promise));
                }
            }
        }

        // Freshly computed every iteration: streams fill up concurrently.
        if is_idle(&shared) {
            backoff::backoff(&mut rng);
        } else if barrier_drain(&shared) {
            return terminate(&shared, VecDeque::new(), None);
        }
    }
}

/// Checks whether the null stream and every registered stream are empty.
fn is_idle(shared: &Shared) -> bool {
    if shared.null_stream.get().is_some_and(|s| !s.is_empty()) {
        return false;
    }

    shared.streams.lock().unwrap().iter().all(|s| s.is_empty())
}

/// Runs one exhaustive drain, flipping the worker state around it.
///
/// # Returns
/// true if any drained task requested shutdown
fn barrier_drain(shared: &Shared) -> bool {
    shared.set_state(WorkerState::Draining);
    let poisoned = drain_all(shared);
    shared.set_state(WorkerState::Running);

    poisoned
}

/// Executes every currently pending task in every stream.
///
/// The null stream drains on its own scoped thread while the registered
/// streams drain in parallel on the rayon pool, one logical drain per
/// stream; within each stream execution is strictly FIFO. The scope joins
/// both halves before returning. Tasks appended mid-drain wait for the next
/// one.
fn drain_all(shared: &Shared) -> bool {
    // Snapshot outside the drain so the registry lock is never held while
    // tasks run; submitters keep resolving handles concurrently.
    let streams: Vec<_> = shared.streams.lock().unwrap().iter().cloned().collect();
    let null_stream = shared.null_stream.get().cloned();
    let poison = AtomicBool::new(false);

    thread::scope(|scope| {
        let flag = &poison;

        if let Some(null_stream) = null_stream {
            scope.spawn(move || run_batch(null_stream.take_all(), flag));
        }

        streams
            .par_iter()
            .for_each(|stream| run_batch(stream.take_all(), flag));
    });

    poison.load(Ordering::Acquire)
}

/// Runs one stream's extracted batch in order, recording poison requests.
fn run_batch(tasks: VecDeque<Task>, poison: &AtomicBool) {
    if tasks.is_empty() {
        return;
    }

    trace!(tasks = tasks.len(), "draining stream batch");

    for task in tasks {
        let mut request_shutdown = false;
        task.run(&mut request_shutdown);

        if request_shutdown {
            poison.store(true, Ordering::Release);
        }
    }
}

/// Terminal sequence: final exhaustive drain, then settle every command the
/// queue will ever hold.
///
/// The control queue is closed and flushed after the state flips to
/// `Terminated`, so any push that raced past the shutdown either lands in the
/// flushed remainder (and is settled here) or observes the closed queue. No
/// promise is ever left unresolved.
fn terminate(shared: &Shared, pending: VecDeque<Command>, promise: Option<Promise<()>>) {
    shared.set_state(WorkerState::Draining);
    drain_all(shared);

    if let Some(promise) = promise {
        promise.fulfil(());
    }

    shared.set_state(WorkerState::Terminated);

    let late = shared.control.close_and_take();
    for command in pending.into_iter().chain(late) {
        settle(shared, command);
    }

    info!("worker thread terminated");
}

/// Cheaply resolves a command that arrived at or after shutdown.
///
/// Structural commands still take effect (their streams will simply never be
/// drained); barriers are trivially satisfied after the final drain.
fn settle(shared: &Shared, command: Command) {
    match command {
        Command::CreateStream(promise) => {
            let stream = Arc::new(Stream::new());
            let id = shared.streams.lock().unwrap().insert(stream);
            promise.fulfil(id);
        }
        Command::DestroyStream(id, promise) => {
            shared.streams.lock().unwrap().remove(id);
            promise.fulfil(());
        }
        Command::Barrier(promise) | Command::Shutdown(promise) => promise.fulfil(()),
    }
}
