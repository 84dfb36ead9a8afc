use conductor::{Coordinator, Event, Task};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[test]
fn test_synchronize_runs_everything_enqueued_before() {
    let coordinator = Coordinator::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..4)
        .map(|_| coordinator.create_stream().unwrap().wait())
        .collect();

    for handle in &handles {
        let stream = coordinator.stream(*handle).unwrap();
        for _ in 0..25 {
            let counter = counter.clone();
            stream.push(Task::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
    }

    let null = coordinator.stream(coordinator.null_stream()).unwrap();
    for _ in 0..25 {
        let counter = counter.clone();
        null.push(Task::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    }

    coordinator.synchronize().unwrap();

    assert_eq!(
        counter.load(Ordering::SeqCst),
        4 * 25 + 25,
        "every task enqueued before synchronize must have executed"
    );
}

#[test]
fn test_concurrent_null_stream_submissions() {
    let coordinator = Coordinator::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let null = coordinator.stream(coordinator.null_stream()).unwrap();

    thread::scope(|scope| {
        for _ in 0..8 {
            let null = null.clone();
            let counter = counter.clone();

            scope.spawn(move || {
                for _ in 0..125 {
                    let counter = counter.clone();
                    null.push(Task::new(move |_| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }));
                }
            });
        }
    });

    coordinator.synchronize().unwrap();

    assert_eq!(
        counter.load(Ordering::SeqCst),
        1000,
        "concurrent appends must neither lose nor duplicate tasks"
    );
}

#[test]
fn test_resolved_submission_implies_timestamp_update() {
    let coordinator = Coordinator::new();
    let event = Arc::new(Event::new());

    coordinator.submit(&event, None).unwrap();
    event.synchronize();

    assert!(
        event.timestamp().is_some(),
        "a resolved done-signal implies the timestamp update already ran"
    );
}

#[test]
fn test_global_coordinator_synchronize() {
    let coordinator = Coordinator::global();
    let event = Arc::new(Event::new());

    coordinator.submit(&event, None).unwrap();
    coordinator.synchronize().unwrap();

    assert!(
        event.timestamp().is_some(),
        "global coordinator should drain submitted work on synchronize"
    );
}
