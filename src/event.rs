//! Caller-owned completion handle for submitted work.
//!
//! An event records the completion futures of the tasks submitted against it,
//! carries a last-update timestamp written by those tasks as they execute,
//! and can be flagged as a global barrier ("all-synchronising") when the
//! submission targeted the default stream. The coordinator only ever touches
//! an event through the free operations below; the event's lifecycle belongs
//! entirely to the caller.

use crate::signal::SignalFuture;

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// A host-visible synchronization handle.
pub struct Event {
    timestamp: Mutex<Option<Instant>>,
    all_synchronising: AtomicBool,
    done_signals: Mutex<Vec<SignalFuture<()>>>,
}

impl Event {
    /// Creates an event with no timestamp, no attached signals, and the
    /// barrier flag cleared.
    pub fn new() -> Self {
        Self {
            timestamp: Mutex::new(None),
            all_synchronising: AtomicBool::new(false),
            done_signals: Mutex::new(Vec::new()),
        }
    }

    /// Returns the instant of the most recent timestamp update, if any.
    pub fn timestamp(&self) -> Option<Instant> {
        *self.timestamp.lock().unwrap()
    }

    /// Checks whether the event was marked as a global barrier.
    pub fn is_all_synchronising(&self) -> bool {
        self.all_synchronising.load(Ordering::Acquire)
    }

    /// Blocks until every done-signal attached so far has resolved.
    ///
    /// Attached signals are drained as they are waited on, so a second call
    /// only waits for signals attached in between.
    pub fn synchronize(&self) {
        let signals: Vec<_> = self.done_signals.lock().unwrap().drain(..).collect();

        // Waiting happens outside the lock so new submissions can keep
        // attaching signals concurrently.
        for signal in signals {
            signal.wait();
        }
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

/// Flags the event as a global barrier.
pub fn mark_as_all_synchronising(event: &Event) {
    event.all_synchronising.store(true, Ordering::Release);
}

/// Attaches a completion future the event will wait on in [`Event::synchronize`].
pub fn add_done_signal(event: &Event, signal: SignalFuture<()>) {
    event.done_signals.lock().unwrap().push(signal);
}

/// Stamps the event with the current instant.
pub fn update_timestamp(event: &Event) {
    *event.timestamp.lock().unwrap() = Some(Instant::now());
}
