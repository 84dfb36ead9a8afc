//! One-shot completion signalling between threads.
//!
//! A [`Promise`] is the producing half: whoever executes the work fulfils it
//! exactly once. A [`SignalFuture`] is the consuming half: any number of
//! threads may hold one (futures are cheap clones of the shared cell) and
//! block until the value arrives. This is the blocking-thread analogue of a
//! join handle with registered waiters: a `Mutex`-guarded slot plus a
//! `Condvar` instead of async wakers.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

struct Cell<T> {
    slot: Mutex<Option<T>>,
    ready: Condvar,
}

/// Producing half of a one-shot completion channel.
///
/// Fulfilling the promise stores the value and wakes every thread blocked on
/// an associated [`SignalFuture`]. A promise is fulfilled at most once; the
/// coordinator guarantees every promise it creates is eventually fulfilled,
/// including during shutdown.
pub struct Promise<T> {
    cell: Arc<Cell<T>>,
}

impl<T> Promise<T> {
    /// Creates an unfulfilled promise.
    pub fn new() -> Self {
        Self {
            cell: Arc::new(Cell {
                slot: Mutex::new(None),
                ready: Condvar::new(),
            }),
        }
    }

    /// Returns a future observing this promise.
    ///
    /// May be called any number of times; all returned futures observe the
    /// same fulfilment.
    pub fn future(&self) -> SignalFuture<T> {
        SignalFuture {
            cell: self.cell.clone(),
        }
    }

    /// Stores the value and wakes all waiting futures.
    pub fn fulfil(&self, value: T) {
        *self.cell.slot.lock().unwrap() = Some(value);
        self.cell.ready.notify_all();
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Consuming half of a one-shot completion channel.
///
/// Blocks the calling thread until the paired [`Promise`] is fulfilled. The
/// value stays in the shared cell, so cloned futures and repeated waits all
/// observe it.
pub struct SignalFuture<T> {
    cell: Arc<Cell<T>>,
}

impl<T> Clone for SignalFuture<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: Clone> SignalFuture<T> {
    /// Blocks until the promise is fulfilled and returns the value.
    pub fn wait(&self) -> T {
        let guard = self.cell.slot.lock().unwrap();
        let guard = self
            .cell
            .ready
            .wait_while(guard, |slot| slot.is_none())
            .unwrap();

        guard
            .as_ref()
            .cloned()
            .expect("signal reported ready but the value is missing")
    }

    /// Blocks until the promise is fulfilled or the timeout elapses.
    ///
    /// # Returns
    /// Some(value) on fulfilment, None if the timeout expired first
    pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
        let guard = self.cell.slot.lock().unwrap();
        let (guard, _) = self
            .cell
            .ready
            .wait_timeout_while(guard, timeout, |slot| slot.is_none())
            .unwrap();

        guard.as_ref().cloned()
    }

    /// Checks whether the promise has been fulfilled, without blocking.
    pub fn is_ready(&self) -> bool {
        self.cell.slot.lock().unwrap().is_some()
    }
}
