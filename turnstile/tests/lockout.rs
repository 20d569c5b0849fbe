//! End-to-end lockout behavior through the public API

use std::sync::Arc;

use chrono::{Duration, Utc};
use turnstile::{LoginGuardConfig, ManualClock, Turnstile, TurnstileBuilder};

const IP: &str = "192.168.1.1";

fn turnstile() -> Turnstile {
    TurnstileBuilder::new()
        .build()
        .expect("Failed to build Turnstile")
}

#[test]
fn test_unseen_identifier() {
    let turnstile = turnstile();

    assert_eq!(turnstile.attempt_count("never-seen"), 0);
    assert!(!turnstile.is_blocked("never-seen"));
    assert_eq!(turnstile.remaining_attempts("never-seen"), 5);
}

#[test]
fn test_login_flow() {
    let turnstile = turnstile();

    turnstile.record_failed_attempt(IP);
    assert_eq!(turnstile.attempt_count(IP), 1);

    turnstile.record_failed_attempt(IP);
    assert_eq!(turnstile.remaining_attempts(IP), 3);

    turnstile.record_successful_attempt(IP);
    assert_eq!(turnstile.attempt_count(IP), 0);
    assert!(!turnstile.is_blocked(IP));

    for _ in 0..5 {
        turnstile.record_failed_attempt(IP);
    }
    assert!(turnstile.is_blocked(IP));
    assert_eq!(turnstile.attempt_count(IP), 5);

    let status = turnstile.lockout_status(IP);
    assert!(status.is_blocked);
    assert_eq!(status.remaining_attempts, 0);
}

#[test]
fn test_identifiers_do_not_interfere() {
    let turnstile = turnstile();

    for _ in 0..5 {
        turnstile.record_failed_attempt("identifier-a");
    }

    assert!(turnstile.is_blocked("identifier-a"));
    assert_eq!(turnstile.attempt_count("identifier-b"), 0);
    assert!(!turnstile.is_blocked("identifier-b"));
}

#[test]
fn test_unlock() {
    let turnstile = Turnstile::new(LoginGuardConfig::permanent(2)).unwrap();

    turnstile.record_failed_attempt(IP);
    turnstile.record_failed_attempt(IP);

    assert!(turnstile.unlock(IP));
    assert!(!turnstile.is_blocked(IP));
    assert!(!turnstile.unlock(IP));
}

#[tokio::test]
async fn test_cleanup_evicts_expired_records() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let turnstile = TurnstileBuilder::new()
        .with_failure_window(Some(Duration::minutes(1)))
        .with_cleanup_interval(std::time::Duration::from_millis(10))
        .with_clock(clock.clone())
        .build()
        .expect("Failed to build Turnstile");

    turnstile.record_failed_attempt("stale");
    clock.advance(Duration::minutes(5));
    turnstile.record_failed_attempt("fresh");

    let cleanup = turnstile.start_cleanup();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert_eq!(turnstile.guard().tracked_identifiers(), 1);
    assert_eq!(turnstile.attempt_count("fresh"), 1);

    cleanup.shutdown().await.expect("Cleanup task failed");
}

#[tokio::test]
async fn test_concurrent_tasks_count_exactly() {
    let turnstile = Turnstile::new(LoginGuardConfig::permanent(10_000)).unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let guard = turnstile.guard().clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..100 {
                guard.record_failed_attempt(IP);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(turnstile.attempt_count(IP), 1600);
    assert!(!turnstile.is_blocked(IP));
}
