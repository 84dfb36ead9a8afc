use conductor::{Coordinator, CoordinatorError, Event, Task, WorkerState};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[test]
fn test_shutdown_executes_all_pending_work() {
    init_logging();

    let coordinator = Coordinator::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let handle = coordinator.create_stream().unwrap().wait();
    let stream = coordinator.stream(handle).unwrap();
    for _ in 0..50 {
        let counter = counter.clone();
        stream.push(Task::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    }

    coordinator.shutdown();

    assert_eq!(
        counter.load(Ordering::SeqCst),
        50,
        "no task posted before shutdown may be left unexecuted"
    );
    assert_eq!(coordinator.worker_state(), WorkerState::Terminated);
}

#[test]
fn test_shutdown_is_idempotent_and_closes_the_surface() {
    let coordinator = Coordinator::new();
    coordinator.start();

    coordinator.shutdown();
    coordinator.shutdown();

    let event = Arc::new(Event::new());
    assert!(matches!(
        coordinator.create_stream().map(|_| ()),
        Err(CoordinatorError::Terminated)
    ));
    assert_eq!(
        coordinator.synchronize(),
        Err(CoordinatorError::Terminated)
    );
    assert_eq!(
        coordinator.submit(&event, None),
        Err(CoordinatorError::Terminated)
    );
}

#[test]
fn test_shutdown_without_ever_starting_the_worker() {
    let coordinator = Coordinator::new();

    coordinator.shutdown();

    assert_eq!(coordinator.worker_state(), WorkerState::Terminated);
}

#[test]
fn test_poison_task_terminates_the_worker() {
    let coordinator = Coordinator::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let handle = coordinator.create_stream().unwrap().wait();
    let stream = coordinator.stream(handle).unwrap();

    let earlier = counter.clone();
    stream.push(Task::new(move |_| {
        earlier.fetch_add(1, Ordering::SeqCst);
    }));

    let poison = Task::new(|request_shutdown: &mut bool| {
        *request_shutdown = true;
    });
    let poisoned = poison.future();
    stream.push(poison);

    poisoned.wait();
    coordinator.shutdown();

    assert_eq!(coordinator.worker_state(), WorkerState::Terminated);
    assert_eq!(
        counter.load(Ordering::SeqCst),
        1,
        "work queued before the poison task must still run"
    );
}

#[test]
fn test_drop_runs_the_shutdown_protocol() {
    let counter = Arc::new(AtomicUsize::new(0));

    {
        let coordinator = Coordinator::new();
        let null = coordinator.stream(coordinator.null_stream()).unwrap();
        for _ in 0..10 {
            let counter = counter.clone();
            null.push(Task::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
    }

    assert_eq!(
        counter.load(Ordering::SeqCst),
        10,
        "dropping the coordinator must drain pending work"
    );
}
