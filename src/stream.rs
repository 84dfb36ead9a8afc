//! Thread-safe FIFO stream of pending tasks.
//!
//! A stream is the work queue associated with one logical execution context.
//! It exposes exactly one primitive — [`Stream::apply`], exclusive access to
//! the entire backing container — and everything else (append, full
//! extraction, emptiness) is built on top of it. Submitters append from
//! arbitrary threads while drain workers extract the full contents; the
//! backing mutex makes both atomic.

use crate::task::Task;

use std::collections::VecDeque;
use std::mem;
use std::sync::Mutex;

/// An ordered, thread-safe queue of pending [`Task`]s.
///
/// Tasks are appended at the tail and drained from the head; order within a
/// stream is FIFO. Order across distinct streams is unspecified until a
/// barrier drain imposes one.
pub struct Stream {
    tasks: Mutex<VecDeque<Task>>,
}

impl Stream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
        }
    }

    /// Runs a mutator with exclusive access to the backing container.
    ///
    /// This is the stream's single atomic operation; no observer can see the
    /// container mid-mutation.
    pub fn apply<R>(&self, f: impl FnOnce(&mut VecDeque<Task>) -> R) -> R {
        f(&mut self.tasks.lock().unwrap())
    }

    /// Appends a task at the tail.
    pub fn push(&self, task: Task) {
        self.apply(|tasks| tasks.push_back(task));
    }

    /// Atomically extracts the stream's full current contents.
    ///
    /// Tasks appended after the extraction are unaffected and wait for the
    /// next drain.
    pub fn take_all(&self) -> VecDeque<Task> {
        self.apply(mem::take)
    }

    /// Checks whether the stream currently holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.apply(|tasks| tasks.is_empty())
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}
