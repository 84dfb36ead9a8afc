//! Error codes and the per-thread last-status cell.

use std::cell::Cell;

use thiserror::Error;

/// Failures surfaced by coordinator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// The stream handle does not name a live stream (never created, or
    /// already destroyed).
    #[error("unknown or destroyed stream handle")]
    UnknownStream,
    /// The coordinator has completed its shutdown protocol and accepts no
    /// further work.
    #[error("coordinator has shut down")]
    Terminated,
}

/// Per-thread status code, in the style of a "last call status" convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// No failure recorded.
    #[default]
    Success,
    /// See [`CoordinatorError::UnknownStream`].
    UnknownStream,
    /// See [`CoordinatorError::Terminated`].
    Terminated,
}

impl From<CoordinatorError> for Status {
    fn from(error: CoordinatorError) -> Self {
        match error {
            CoordinatorError::UnknownStream => Status::UnknownStream,
            CoordinatorError::Terminated => Status::Terminated,
        }
    }
}

thread_local! {
    static LAST_ERROR: Cell<Status> = const { Cell::new(Status::Success) };
}

/// Reads the calling thread's last-status cell.
///
/// Each thread owns an independent cell, initialized to [`Status::Success`].
/// The cell is advisory: coordinator operations never write it implicitly.
pub fn last_error() -> Status {
    LAST_ERROR.get()
}

/// Writes the calling thread's last-status cell, returning the previous value.
pub fn set_last_error(status: Status) -> Status {
    LAST_ERROR.replace(status)
}
