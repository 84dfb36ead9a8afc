//! Control commands and the privileged queue that carries them.
//!
//! Structural mutation of coordinator state only ever happens through an
//! enum-tagged command executed on the worker thread, strictly in FIFO order
//! and never interleaved with a barrier drain. That sequencing is what makes
//! it safe to mutate the stream registry while submitters run concurrently.

use crate::coordinator::registry::StreamId;
use crate::error::CoordinatorError;
use crate::signal::Promise;

use std::collections::VecDeque;
use std::mem;
use std::sync::Mutex;

/// An administrative command, paired with the promise its requester waits on.
pub(crate) enum Command {
    CreateStream(Promise<StreamId>),
    DestroyStream(StreamId, Promise<()>),
    Barrier(Promise<()>),
    Shutdown(Promise<()>),
}

struct ControlState {
    commands: VecDeque<Command>,
    closed: bool,
}

/// The coordinator's privileged command queue.
///
/// Closing the queue and taking the remainder is a single atomic step, so
/// every accepted command is eventually settled by the worker and every push
/// after shutdown observes [`CoordinatorError::Terminated`].
pub(crate) struct ControlQueue {
    state: Mutex<ControlState>,
}

impl ControlQueue {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(ControlState {
                commands: VecDeque::new(),
                closed: false,
            }),
        }
    }

    /// Appends a command, failing once the queue has been closed by the
    /// worker's terminal sequence.
    pub(crate) fn push(&self, command: Command) -> Result<(), CoordinatorError> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(CoordinatorError::Terminated);
        }

        state.commands.push_back(command);
        Ok(())
    }

    /// Atomically extracts every currently queued command.
    pub(crate) fn take_all(&self) -> VecDeque<Command> {
        mem::take(&mut self.state.lock().unwrap().commands)
    }

    /// Closes the queue against further pushes and extracts the remainder.
    pub(crate) fn close_and_take(&self) -> VecDeque<Command> {
        let mut state = self.state.lock().unwrap();
        state.closed = true;

        mem::take(&mut state.commands)
    }
}
