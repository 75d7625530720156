use std::sync::{Arc, Mutex};
use std::time::Duration;
use taleweaver_config::TaleweaverConfig;
use taleweaver_error::{FailureClass, GeminiError, GeminiErrorKind};
use taleweaver_retry::{Attempt, FailureBudget, RetryPolicy, retry_with_backoff};

fn immediate(max_failures: u32) -> RetryPolicy {
    RetryPolicy::builder()
        .max_failures(max_failures)
        .initial_delay(Duration::ZERO)
        .quota_delay(Duration::ZERO)
        .max_delay(Duration::ZERO)
        .build()
        .unwrap()
}

fn http(status_code: u16, message: &str) -> GeminiError {
    GeminiError::new(GeminiErrorKind::HttpError {
        status_code,
        message: message.to_string(),
    })
}

#[tokio::test]
async fn test_always_failing_call_exhausts_exact_budget() {
    let calls = Arc::new(Mutex::new(0u32));
    let counter = calls.clone();
    let result: Result<(), _> = retry_with_backoff(&immediate(7), "always fails", |_| {
        let counter = counter.clone();
        async move {
            *counter.lock().unwrap() += 1;
            Err(http(500, "internal"))
        }
    })
    .await;

    let exhausted = result.unwrap_err();
    assert_eq!(*calls.lock().unwrap(), 7);
    assert_eq!(exhausted.attempts, 7);
    assert_eq!(exhausted.failures, 7);
    assert!(exhausted.to_string().contains("internal"));
}

#[tokio::test]
async fn test_invalid_request_drains_budget_faster() {
    let calls = Arc::new(Mutex::new(0u32));
    let counter = calls.clone();
    let result: Result<(), _> = retry_with_backoff(&immediate(20), "bad request", |_| {
        let counter = counter.clone();
        async move {
            *counter.lock().unwrap() += 1;
            Err(http(400, "Invalid JSON payload"))
        }
    })
    .await;

    assert!(result.is_err());
    // 11 per call: the second call reaches 22 >= 20
    assert_eq!(*calls.lock().unwrap(), 2);
}

#[tokio::test]
async fn test_success_after_transient_failures() -> anyhow::Result<()> {
    let value = retry_with_backoff(&immediate(10), "flaky", |attempt| async move {
        if attempt.number <= 3 {
            Err(http(503, "unavailable"))
        } else {
            Ok(attempt.number * 10)
        }
    })
    .await
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    assert_eq!(value, 40);
    Ok(())
}

#[tokio::test]
async fn test_safety_block_flags_following_attempts() {
    let seen: Arc<Mutex<Vec<Attempt>>> = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let result = retry_with_backoff(&immediate(10), "safety", |attempt| {
        let log = log.clone();
        async move {
            log.lock().unwrap().push(attempt);
            if attempt.safety_retry {
                Ok("softened")
            } else {
                Err(http(400, "Request blocked for safety reasons"))
            }
        }
    })
    .await;

    assert_eq!(result.ok(), Some("softened"));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(!seen[0].safety_retry);
    assert!(seen[1].safety_retry);
}

#[test]
fn test_backoff_doubles_up_to_cap() {
    let policy = RetryPolicy::builder()
        .max_failures(100u32)
        .initial_delay(Duration::from_secs(10))
        .max_delay(Duration::from_secs(60))
        .jitter(false)
        .build()
        .unwrap();
    let delays: Vec<u64> = policy.schedule().take(5).map(|d| d.as_secs()).collect();
    assert_eq!(delays, [10, 20, 40, 60, 60]);
}

#[test]
fn test_quota_error_waits_quota_delay() {
    let policy = RetryPolicy::builder()
        .initial_delay(Duration::from_secs(10))
        .quota_delay(Duration::from_secs(60))
        .jitter(false)
        .build()
        .unwrap();
    assert_eq!(
        policy.retry_after(FailureClass::QuotaExhausted),
        Some(Duration::from_secs(60))
    );
    assert_eq!(policy.retry_after(FailureClass::ServerError), None);
    assert_eq!(policy.retry_after(FailureClass::SafetyBlocked), None);
}

#[test]
fn test_budget_charges_invalid_requests_extra() {
    let policy = RetryPolicy::builder().max_failures(15u32).build().unwrap();
    let mut budget = FailureBudget::new(&policy);
    assert!(budget.charge(FailureClass::Other));
    assert!(budget.charge(FailureClass::InvalidRequest));
    assert_eq!(budget.failures(), 12);
    assert!(budget.charge(FailureClass::QuotaExhausted));
    assert!(budget.charge(FailureClass::ServerError));
    assert!(!budget.charge(FailureClass::ServerError));
    assert_eq!(budget.failures(), 15);
}

#[tokio::test]
async fn test_quota_errors_count_against_budget() {
    let calls = Arc::new(Mutex::new(0u32));
    let counter = calls.clone();
    let result: Result<(), _> = retry_with_backoff(&immediate(3), "quota", |_| {
        let counter = counter.clone();
        async move {
            *counter.lock().unwrap() += 1;
            Err(http(429, "Resource has been exhausted"))
        }
    })
    .await;

    let exhausted = result.unwrap_err();
    assert_eq!(*calls.lock().unwrap(), 3);
    assert_eq!(exhausted.failures, 3);
}

#[test]
fn test_jitter_stays_within_bounds() {
    let policy = RetryPolicy::builder().build().unwrap();
    for _ in 0..100 {
        let d = policy.jittered(Duration::from_secs(10));
        assert!(d >= Duration::from_secs(5) && d < Duration::from_secs(15));
    }
}

#[test]
fn test_policy_from_bundled_config() -> anyhow::Result<()> {
    let config = TaleweaverConfig::bundled()?;
    let policy = RetryPolicy::from_config(&config.retry)?;
    assert_eq!(*policy.max_failures(), 1000);
    assert_eq!(*policy.initial_delay(), Duration::from_secs(10));
    assert_eq!(policy.cost(FailureClass::InvalidRequest), 11);
    assert_eq!(policy.cost(FailureClass::SafetyBlocked), 1);
    Ok(())
}

#[test]
fn test_zero_budget_is_rejected() {
    assert!(RetryPolicy::builder().max_failures(0u32).build().is_err());
}
