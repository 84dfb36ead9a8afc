use conductor::{Coordinator, CoordinatorError, Event, StreamId, Task};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_create_stream_before_worker_ever_ran() {
    let coordinator = Coordinator::new();

    let handle = coordinator.create_stream().unwrap().wait();

    assert!(
        coordinator.stream(handle).is_some(),
        "handle should resolve to a live stream"
    );
}

#[test]
fn test_destroy_removes_only_the_matching_stream() {
    let coordinator = Coordinator::new();
    let s1 = coordinator.create_stream().unwrap().wait();
    let s2 = coordinator.create_stream().unwrap().wait();
    let s3 = coordinator.create_stream().unwrap().wait();

    let counter = Arc::new(AtomicUsize::new(0));
    for handle in [s1, s3] {
        let counter = counter.clone();
        coordinator
            .stream(handle)
            .unwrap()
            .push(Task::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
    }

    coordinator.destroy_stream_async(s2).unwrap().wait();
    coordinator.synchronize().unwrap();

    assert!(coordinator.stream(s2).is_none(), "destroyed handle is dead");
    assert!(coordinator.stream(s1).is_some(), "s1 must survive");
    assert!(coordinator.stream(s3).is_some(), "s3 must survive");
    assert_eq!(
        counter.load(Ordering::SeqCst),
        2,
        "pending work on surviving streams must be unaffected"
    );
}

#[test]
fn test_destroyed_handle_rejects_submission() {
    let coordinator = Coordinator::new();
    let handle = coordinator.create_stream().unwrap().wait();

    coordinator.destroy_stream_async(handle).unwrap();
    coordinator.synchronize().unwrap();

    let event = Arc::new(Event::new());
    assert_eq!(
        coordinator.submit(&event, Some(handle)),
        Err(CoordinatorError::UnknownStream),
        "submission against a destroyed handle must fail cleanly"
    );
    assert!(coordinator.stream(handle).is_none());
}

#[test]
fn test_stale_handle_does_not_alias_a_new_stream() {
    let coordinator = Coordinator::new();
    let stale = coordinator.create_stream().unwrap().wait();

    coordinator.destroy_stream_async(stale).unwrap().wait();

    // A new stream may reuse the freed slot; the stale handle must still
    // resolve to nothing.
    let fresh = coordinator.create_stream().unwrap().wait();

    assert!(coordinator.stream(fresh).is_some());
    assert!(
        coordinator.stream(stale).is_none(),
        "stale handle must not resurrect onto a reused slot"
    );
}

#[test]
fn test_null_stream_is_created_exactly_once() {
    let coordinator = Coordinator::new();

    let first = coordinator.null_stream();
    let second = coordinator.null_stream();

    assert_eq!(first, second, "null handle must be stable");
    assert!(
        Arc::ptr_eq(
            &coordinator.stream(first).unwrap(),
            &coordinator.stream(second).unwrap()
        ),
        "both handles must resolve to the same backing stream"
    );
}

#[test]
fn test_null_stream_cannot_be_destroyed() {
    let coordinator = Coordinator::new();
    coordinator.null_stream();

    assert!(matches!(
        coordinator.destroy_stream_async(StreamId::NULL),
        Err(CoordinatorError::UnknownStream)
    ));
}
