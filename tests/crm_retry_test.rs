mod common;

use checkout_sync::domain::error::CrmError;
use checkout_sync::services::crm_sync::{CrmRetryPolicy, CrmSync, RetryPolicy};
use common::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;

const BASE: Duration = Duration::from_millis(1000);

fn sync_with(crm: Arc<ScriptedCrm>, call_timeout: Duration) -> CrmSync {
    CrmSync::new(crm, CrmRetryPolicy::for_crm(3, BASE), call_timeout)
}

/// Paused time advances straight to timer deadlines, give or take the
/// timer wheel's millisecond rounding.
fn assert_elapsed(start: Instant, expected: Duration) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(20),
        "expected ~{expected:?}, got {elapsed:?}"
    );
}

// ── transient failures back off linearly ───────────────────────────────────
// 503, 503, then OK: three attempts, waits of 1s then 2s.

#[tokio::test(start_paused = true)]
async fn retries_server_errors_with_linear_backoff() {
    let crm = Arc::new(ScriptedCrm::new(vec![
        crm_status(503),
        crm_status(503),
        crm_ok("B-42"),
    ]));
    let sync = sync_with(crm.clone(), Duration::from_secs(10));
    let order = make_order("ORD-1700000000200-RETRY1", 1);

    let start = Instant::now();
    let outcome = sync.sync(&order).await;

    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.result.unwrap().id.as_deref(), Some("B-42"));
    assert_eq!(crm.calls(), 3);
    assert_elapsed(start, BASE * 3);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_attempts() {
    let crm = Arc::new(ScriptedCrm::new(vec![
        crm_status(500),
        crm_status(502),
        crm_status(503),
        crm_ok("never"),
    ]));
    let sync = sync_with(crm.clone(), Duration::from_secs(10));
    let order = make_order("ORD-1700000000201-RETRY2", 1);

    let outcome = sync.sync(&order).await;

    assert_eq!(outcome.attempts, 3);
    assert!(matches!(
        outcome.result,
        Err(CrmError::Status { status: 503, .. })
    ));
    assert_eq!(crm.calls(), 3);
}

// ── permanent failures stop immediately ────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn client_error_is_not_retried() {
    let crm = Arc::new(ScriptedCrm::new(vec![crm_status(400)]));
    let sync = sync_with(crm.clone(), Duration::from_secs(10));
    let order = make_order("ORD-1700000000202-RETRY3", 1);

    let start = Instant::now();
    let outcome = sync.sync(&order).await;

    assert_eq!(outcome.attempts, 1);
    assert_eq!(crm.calls(), 1);
    assert_elapsed(start, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn missing_configuration_is_not_retried() {
    let crm = Arc::new(ScriptedCrm::new(vec![Err(CrmError::NotConfigured)]));
    let sync = sync_with(crm.clone(), Duration::from_secs(10));
    let order = make_order("ORD-1700000000203-RETRY4", 1);

    let outcome = sync.sync(&order).await;

    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.result.unwrap_err(), CrmError::NotConfigured);
}

// ── per-call timeout ───────────────────────────────────────────────────────
// A CRM that never answers in time surfaces as a retryable timeout.

#[tokio::test(start_paused = true)]
async fn slow_calls_time_out_and_are_retried() {
    let crm = Arc::new(ScriptedCrm::slow(Duration::from_secs(60)));
    let sync = sync_with(crm.clone(), Duration::from_secs(10));
    let order = make_order("ORD-1700000000204-RETRY5", 1);

    let start = Instant::now();
    let outcome = sync.sync(&order).await;

    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.result.unwrap_err(), CrmError::Timeout);
    assert_eq!(crm.calls(), 3);
    // three 10s timeouts plus 1s and 2s of backoff
    assert_elapsed(start, Duration::from_secs(33));
}

// ── generic policy ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn policy_passes_attempt_number_and_honours_predicate() {
    let policy = RetryPolicy::new(5, Duration::from_millis(10), |e: &&str| *e == "busy");
    let seen = AtomicU32::new(0);

    let outcome = policy
        .run(|attempt| {
            seen.store(attempt, Ordering::SeqCst);
            async move {
                match attempt {
                    1 | 2 => Err::<(), &str>("busy"),
                    _ => Err("broken"),
                }
            }
        })
        .await;

    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.result, Err("broken"));
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[test]
fn zero_attempts_is_clamped_to_one() {
    let policy = CrmRetryPolicy::for_crm(0, BASE);
    assert_eq!(policy.max_attempts(), 1);
    assert_eq!(policy.delay_after(2), BASE * 2);
}

#[test]
fn default_policy_matches_crm_defaults() {
    let policy = CrmRetryPolicy::default();
    assert_eq!(policy.max_attempts(), 3);
    assert_eq!(policy.delay_after(1), BASE);
}

#[test]
fn retryable_classification() {
    assert!(CrmError::Timeout.is_retryable());
    assert!(CrmError::Connect("refused".into()).is_retryable());
    assert!(CrmError::Status { status: 500, body: String::new() }.is_retryable());
    assert!(CrmError::Transport("connect ECONNREFUSED 10.0.0.1:443".into()).is_retryable());
    assert!(CrmError::Transport("Network is unreachable".into()).is_retryable());

    assert!(!CrmError::NotConfigured.is_retryable());
    assert!(!CrmError::Status { status: 404, body: String::new() }.is_retryable());
    assert!(!CrmError::Transport("invalid json in response".into()).is_retryable());
}
