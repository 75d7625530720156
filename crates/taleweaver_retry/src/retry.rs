//! The retry loop.

use crate::{FailureBudget, RetryPolicy};
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use taleweaver_error::{ClassifyFailure, FailureClass};
use tokio_retry2::{Retry, RetryError};
use tracing::{info, instrument, warn};

/// Context handed to each attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attempt {
    /// One-based attempt number
    pub number: u32,
    /// A previous attempt was blocked by safety filters; the operation may
    /// soften its request
    pub safety_retry: bool,
}

/// Returned when the failure budget is spent.
#[derive(Debug, derive_more::Display)]
#[display("gave up after {} attempts ({} failures charged): {}", attempts, failures, last_error)]
pub struct RetryExhausted<E: std::fmt::Display> {
    /// Calls made
    pub attempts: u32,
    /// Failures charged against the budget
    pub failures: u32,
    /// Error from the final attempt
    pub last_error: E,
}

impl<E: std::fmt::Display> RetryExhausted<E> {
    /// The final attempt's error.
    pub fn into_last_error(self) -> E {
        self.last_error
    }
}

/// Run `op` until it succeeds or the policy's failure budget is spent.
///
/// Each failure is classified through [`ClassifyFailure`]: quota errors wait
/// the quota delay, invalid requests cost extra budget and safety blocks set
/// [`Attempt::safety_retry`] for the following attempts. Other waits follow
/// [`RetryPolicy::schedule`].
///
/// Callers that only care about presence can use `.ok()` on the result.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use taleweaver_error::{GeminiError, GeminiErrorKind};
/// use taleweaver_retry::{RetryPolicy, retry_with_backoff};
///
/// # #[tokio::main]
/// # async fn main() {
/// let policy = RetryPolicy::builder()
///     .max_failures(5u32)
///     .initial_delay(Duration::ZERO)
///     .build()
///     .unwrap();
/// let result = retry_with_backoff(&policy, "demo", |attempt| async move {
///     if attempt.number < 3 {
///         Err(GeminiError::new(GeminiErrorKind::EmptyResponse("demo".into())))
///     } else {
///         Ok(attempt.number)
///     }
/// })
/// .await;
/// assert_eq!(result.unwrap(), 3);
/// # }
/// ```
#[instrument(skip(policy, op), fields(max_failures = policy.max_failures()))]
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(Attempt) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ClassifyFailure + std::fmt::Display,
{
    let state = Mutex::new(Progress {
        attempt: Attempt::default(),
        budget: FailureBudget::new(policy),
    });

    let result = Retry::spawn(policy.schedule(), || {
        let attempt = {
            let mut progress = state.lock().unwrap_or_else(PoisonError::into_inner);
            progress.attempt.number += 1;
            progress.attempt
        };
        let call = op(attempt);
        let state = &state;
        async move {
            let error = match call.await {
                Ok(value) => {
                    if attempt.number > 1 {
                        info!(attempts = attempt.number, "{} succeeded after retrying", label);
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            let class = error.failure_class();
            warn!(attempt = attempt.number, class = %class, error = %error, "{} failed", label);
            let mut progress = state.lock().unwrap_or_else(PoisonError::into_inner);
            match class {
                FailureClass::SafetyBlocked => {
                    info!("Blocked by safety filters; next attempt will soften the request");
                    progress.attempt.safety_retry = true;
                }
                FailureClass::InvalidRequest => {
                    warn!("Invalid request; check the request format");
                }
                _ => {}
            }

            if !progress.budget.charge(class) {
                warn!(
                    attempts = attempt.number,
                    failures = progress.budget.failures(),
                    "Giving up on {}",
                    label
                );
                return Err(RetryError::Permanent(error));
            }
            let retry_after = policy.retry_after(class);
            info!(
                failures = progress.budget.failures(),
                retry_after_secs = retry_after.map(|d| d.as_secs_f64()),
                "Retrying {}",
                label
            );
            Err(RetryError::Transient {
                err: error,
                retry_after,
            })
        }
    })
    .await;

    result.map_err(|last_error| {
        let progress = state.into_inner().unwrap_or_else(PoisonError::into_inner);
        RetryExhausted {
            attempts: progress.attempt.number,
            failures: progress.budget.failures(),
            last_error,
        }
    })
}

/// Attempt context and budget shared across calls.
struct Progress<'a> {
    attempt: Attempt,
    budget: FailureBudget<'a>,
}
