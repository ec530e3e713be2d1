// Tests for the single-use deferred result handoff

use sendrecv_core::deferred::{self, DeferredError, Status};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_wait_returns_only_after_delayed_completion() {
    let (completer, token) = deferred::channel::<&'static str>();
    let delay = Duration::from_millis(150);

    let started = Instant::now();
    let producer = thread::spawn(move || {
        thread::sleep(delay);
        completer.complete("offer");
    });

    let value = token.wait().unwrap();
    assert_eq!(value, "offer");
    assert!(started.elapsed() >= delay);
    producer.join().unwrap();
}

#[test]
fn test_try_take_before_completion_is_pending() {
    let (completer, token) = deferred::channel::<u32>();

    let token = match token.try_take().unwrap() {
        Status::Pending(token) => token,
        Status::Ready(_) => panic!("Read before completion"),
    };

    completer.complete(7);
    match token.try_take().unwrap() {
        Status::Ready(v) => assert_eq!(v, 7),
        Status::Pending(_) => panic!("Still pending after completion"),
    }
}

#[test]
fn test_wait_timeout_hands_token_back() {
    let (completer, token) = deferred::channel::<u32>();

    let status = token.wait_timeout(Duration::from_millis(20)).unwrap();
    assert!(!status.is_ready());
    let token = match status {
        Status::Pending(token) => token,
        Status::Ready(_) => unreachable!(),
    };

    thread::spawn(move || completer.complete(42));
    match token.wait_timeout(Duration::from_secs(5)).unwrap() {
        Status::Ready(v) => assert_eq!(v, 42),
        Status::Pending(_) => panic!("Timed out waiting for completion"),
    }
}

#[test]
fn test_dropped_completer_abandons() {
    let (completer, token) = deferred::channel::<u32>();
    drop(completer);
    assert_eq!(token.wait().unwrap_err(), DeferredError::Abandoned);
}

#[test]
fn test_complete_after_consumer_dropped_is_silent() {
    let (completer, token) = deferred::channel::<u32>();
    drop(token);
    completer.complete(1);
}

#[test]
fn test_continuation_runs_on_completing_thread() {
    let (tx, rx) = mpsc::channel();
    let completer = deferred::continuation(move |result: Result<String, DeferredError>| {
        tx.send((result, thread::current().id())).unwrap();
    });

    let producer = thread::spawn(move || {
        completer.complete("reply".to_string());
        thread::current().id()
    });
    let producer_id = producer.join().unwrap();

    let (result, ran_on) = rx.recv().unwrap();
    assert_eq!(result.unwrap(), "reply");
    assert_eq!(ran_on, producer_id);
}

#[test]
fn test_continuation_sees_abandon() {
    let (tx, rx) = mpsc::channel();
    let completer = deferred::continuation(move |result: Result<u8, DeferredError>| {
        tx.send(result).unwrap();
    });

    drop(completer);
    assert_eq!(rx.recv().unwrap(), Err(DeferredError::Abandoned));
}
