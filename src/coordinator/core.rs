//! The execution coordinator: stream lifecycle, submission, global sync,
//! and the shutdown protocol.
//!
//! One coordinator owns one control queue, a registry of user streams, a
//! lazily created default ("null") stream, and a single background worker
//! thread that executes control commands and drains pending work. Most code
//! goes through the process-wide instance from [`Coordinator::global`], but
//! independent instances are plain values with their own worker, which is
//! what the integration tests build.

use crate::coordinator::command::{Command, ControlQueue};
use crate::coordinator::registry::{StreamId, StreamRegistry};
use crate::coordinator::worker;
use crate::error::CoordinatorError;
use crate::event::{self, Event};
use crate::signal::{Promise, SignalFuture};
use crate::stream::Stream;
use crate::task::Task;

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle};

use tracing::debug;

static GLOBAL: OnceLock<Coordinator> = OnceLock::new();

/// Lifecycle of the coordinator's worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// No worker thread has been spawned yet.
    NotStarted = 0,
    /// The worker is polling: draining commands, backing off when idle.
    Running = 1,
    /// The worker is inside an exhaustive drain.
    Draining = 2,
    /// The worker has finished its final drain and exited.
    Terminated = 3,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::NotStarted,
            1 => WorkerState::Running,
            2 => WorkerState::Draining,
            _ => WorkerState::Terminated,
        }
    }
}

/// State shared between the coordinator handle and its worker thread.
pub(crate) struct Shared {
    pub(crate) control: ControlQueue,
    pub(crate) streams: Mutex<StreamRegistry>,
    pub(crate) null_stream: OnceLock<Arc<Stream>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    state: AtomicU8,
}

impl Shared {
    pub(crate) fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn try_claim_start(&self) -> bool {
        self.state
            .compare_exchange(
                WorkerState::NotStarted as u8,
                WorkerState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// The CPU-hosted execution coordinator.
///
/// Callers submit work against stream handles (or the default stream) from
/// any thread; a single lazily started worker thread executes administrative
/// commands, detects pending work, and drains all streams in parallel. See
/// the crate docs for the full model.
pub struct Coordinator {
    shared: Arc<Shared>,
}

impl Coordinator {
    /// Creates an inert coordinator.
    ///
    /// The worker thread starts lazily on the first operation that needs it;
    /// no thread is spawned here.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                control: ControlQueue::new(),
                streams: Mutex::new(StreamRegistry::new()),
                null_stream: OnceLock::new(),
                worker: Mutex::new(None),
                state: AtomicU8::new(WorkerState::NotStarted as u8),
            }),
        }
    }

    /// Returns the process-wide coordinator, creating it on first access.
    ///
    /// The global instance is never dropped; embedders that need a bounded
    /// worker lifetime call [`Coordinator::shutdown`] on it explicitly at
    /// teardown.
    pub fn global() -> &'static Coordinator {
        GLOBAL.get_or_init(Coordinator::new)
    }

    /// Ensures the worker thread is running. Idempotent.
    pub fn start(&self) {
        self.ensure_worker();
    }

    /// Reports the worker thread's current lifecycle state.
    pub fn worker_state(&self) -> WorkerState {
        self.shared.state()
    }

    /// Requests creation of a new stream.
    ///
    /// Posts a control command and returns a future resolving with the new
    /// stream's handle once the worker has executed it. Usable before the
    /// worker thread has ever run; posting also starts the worker.
    ///
    /// # Errors
    /// [`CoordinatorError::Terminated`] after shutdown.
    pub fn create_stream(&self) -> Result<SignalFuture<StreamId>, CoordinatorError> {
        let promise = Promise::new();
        let future = promise.future();

        self.shared.control.push(Command::CreateStream(promise))?;
        self.ensure_worker();

        Ok(future)
    }

    /// Requests removal of the stream matching the given handle.
    ///
    /// The returned future resolves once the worker has removed the stream
    /// from the registry. Destroying a stream that still holds undrained
    /// tasks leaves their ordering relative to a concurrent
    /// [`Coordinator::synchronize`] unspecified; synchronize first if
    /// drain-before-destroy is required.
    ///
    /// # Errors
    /// [`CoordinatorError::UnknownStream`] for the null stream,
    /// [`CoordinatorError::Terminated`] after shutdown.
    pub fn destroy_stream_async(
        &self,
        stream: StreamId,
    ) -> Result<SignalFuture<()>, CoordinatorError> {
        if stream.is_null() {
            return Err(CoordinatorError::UnknownStream);
        }

        let promise = Promise::new();
        let future = promise.future();

        self.shared
            .control
            .push(Command::DestroyStream(stream, promise))?;
        self.ensure_worker();

        Ok(future)
    }

    /// Returns the default stream's handle, creating the stream exactly once
    /// and ensuring the worker is running.
    pub fn null_stream(&self) -> StreamId {
        self.null_stream_arc();
        self.ensure_worker();

        StreamId::NULL
    }

    /// Resolves a handle to its live stream.
    ///
    /// Returns `None` for destroyed or never-created handles. This is the
    /// hook an outer API layer uses to enqueue its own tasks onto a stream.
    pub fn stream(&self, stream: StreamId) -> Option<Arc<Stream>> {
        if stream.is_null() {
            return Some(self.null_stream_arc());
        }

        self.shared.streams.lock().unwrap().get(stream)
    }

    /// Submits a timestamp-update task against the event.
    ///
    /// The task is appended at the target stream's tail and its completion
    /// future is attached to the event. With no stream given, the task goes
    /// to the null stream and the event is additionally marked as a global
    /// barrier.
    ///
    /// # Errors
    /// [`CoordinatorError::UnknownStream`] if the handle no longer names a
    /// live stream, [`CoordinatorError::Terminated`] after shutdown.
    pub fn submit(
        &self,
        event: &Arc<Event>,
        stream: Option<StreamId>,
    ) -> Result<(), CoordinatorError> {
        if self.shared.state() == WorkerState::Terminated {
            return Err(CoordinatorError::Terminated);
        }

        let target = match stream {
            Some(id) => self.stream(id).ok_or(CoordinatorError::UnknownStream)?,
            None => {
                event::mark_as_all_synchronising(event);
                self.null_stream_arc()
            }
        };

        let stamped = Arc::clone(event);
        let task = Task::new(move |_| event::update_timestamp(&stamped));
        event::add_done_signal(event, task.future());

        target.push(task);
        self.ensure_worker();

        Ok(())
    }

    /// Blocks until every task enqueued before this call has executed.
    ///
    /// Routed through the control queue as a barrier command, so it is
    /// ordered consistently with concurrent stream creation and destruction.
    ///
    /// # Errors
    /// [`CoordinatorError::Terminated`] after shutdown.
    pub fn synchronize(&self) -> Result<(), CoordinatorError> {
        let promise = Promise::new();
        let future = promise.future();

        self.shared.control.push(Command::Barrier(promise))?;
        self.ensure_worker();

        future.wait();
        Ok(())
    }

    /// Runs the shutdown protocol: post a shutdown command, join the worker,
    /// then wait on the command's own future.
    ///
    /// Joining blocks until the worker has performed its final exhaustive
    /// drain, so no task posted before this call is left unexecuted. The
    /// trailing wait covers the window where another thread raced the start
    /// or reaped the join handle first. Idempotent; also runs on drop.
    pub fn shutdown(&self) {
        let promise = Promise::new();
        let future = promise.future();

        match self.shared.control.push(Command::Shutdown(promise)) {
            Ok(()) => {
                debug!("shutdown requested");
                self.ensure_worker();
                self.join_worker();
                future.wait();
            }
            // Queue already closed: the worker is past its final drain.
            Err(_) => self.join_worker(),
        }
    }

    fn null_stream_arc(&self) -> Arc<Stream> {
        self.shared
            .null_stream
            .get_or_init(|| Arc::new(Stream::new()))
            .clone()
    }

    /// Spawns the worker thread once; later calls are no-ops.
    ///
    /// The handle slot is written under the same lock [`Self::join_worker`]
    /// takes, so a concurrent shutdown either joins this handle or finds the
    /// slot empty and falls back to waiting on its command future.
    fn ensure_worker(&self) {
        let mut worker = self.shared.worker.lock().unwrap();

        if self.shared.try_claim_start() {
            let shared = self.shared.clone();
            *worker = Some(thread::spawn(move || worker::run(shared)));
        }
    }

    fn join_worker(&self) {
        let handle = self.shared.worker.lock().unwrap().take();

        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
