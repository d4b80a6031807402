use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::BridgeError;

use super::*;

#[test]
fn test_initial_state_is_idle() {
    let tracker = LoadTracker::new();
    assert!(!tracker.is_loading());
}

#[test]
fn test_signal_transitions() {
    let tracker = LoadTracker::new();

    tracker.load_started();
    assert!(tracker.is_loading());

    tracker.load_finished();
    assert!(!tracker.is_loading());
}

#[tokio::test]
async fn test_await_idle_returns_immediately_when_idle() {
    let tracker = LoadTracker::new();
    let start = Instant::now();
    tracker
        .await_idle(Duration::from_millis(50), Duration::from_secs(1))
        .await
        .expect("idle tracker should not time out");
    assert!(start.elapsed() < Duration::from_millis(40));
}

#[tokio::test]
async fn test_await_idle_waits_for_finish() {
    let tracker = Arc::new(LoadTracker::new());
    tracker.load_started();

    let signal = tracker.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        signal.load_finished();
    });

    let start = Instant::now();
    tracker
        .await_idle(Duration::from_millis(10), Duration::from_secs(2))
        .await
        .expect("load finishes within the deadline");
    assert!(start.elapsed() >= Duration::from_millis(140));
}

#[tokio::test]
async fn test_await_idle_times_out() {
    let tracker = LoadTracker::new();
    tracker.load_started();

    let result = tracker
        .await_idle(Duration::from_millis(10), Duration::from_millis(100))
        .await;
    assert!(matches!(result, Err(BridgeError::Timeout(_))));
}
