//! Randomized idle backoff for the worker thread.
//!
//! A hot spin wastes a core; an unbounded blocking wait adds wake-up latency
//! and a lost-wakeup hazard. The worker instead relaxes for a bounded,
//! randomly drawn number of steps between polls, which also de-correlates it
//! from submitters hitting the queues in lockstep.

use std::hint;
use std::thread;

use rand::Rng;

pub(crate) const BACKOFF_MIN_STEPS: u32 = 3;
pub(crate) const BACKOFF_MAX_STEPS: u32 = 1031;

/// Performs one low-cost CPU relaxation step.
pub fn pause_or_yield() {
    hint::spin_loop();
}

/// Relaxes for a uniformly drawn number of steps, ceding the core to the
/// scheduler every 64th step.
pub(crate) fn backoff(rng: &mut impl Rng) {
    let steps = rng.random_range(BACKOFF_MIN_STEPS..=BACKOFF_MAX_STEPS);

    for step in 0..steps {
        if step % 64 == 63 {
            thread::yield_now();
        } else {
            pause_or_yield();
        }
    }
}
