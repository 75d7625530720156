//! Retry policy and backoff bookkeeping.

use rand::Rng;
use std::time::Duration;
use taleweaver_config::RetryConfig;
use taleweaver_error::{ConfigError, FailureClass, TaleweaverResult};
use tokio_retry2::strategy::ExponentialBackoff;

/// Budget and delays for [`retry_with_backoff`](crate::retry_with_backoff).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use taleweaver_retry::RetryPolicy;
///
/// let policy = RetryPolicy::builder()
///     .max_failures(20u32)
///     .initial_delay(Duration::from_secs(1))
///     .build()
///     .unwrap();
/// assert_eq!(*policy.max_failures(), 20);
/// assert_eq!(*policy.max_delay(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, derive_builder::Builder, derive_getters::Getters)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct RetryPolicy {
    /// Failure budget; the wrapper gives up once this many failures accrue
    #[builder(default = "1000")]
    max_failures: u32,
    /// Delay after the first failure
    #[builder(default = "Duration::from_secs(10)")]
    initial_delay: Duration,
    /// Cap for the doubled delay
    #[builder(default = "Duration::from_secs(60)")]
    max_delay: Duration,
    /// Delay used after a quota error
    #[builder(default = "Duration::from_secs(60)")]
    quota_delay: Duration,
    /// Extra failures charged for an invalid request
    #[builder(default = "10")]
    invalid_request_penalty: u32,
    /// Scale each delay by a random factor in `[0.5, 1.5)`
    #[builder(default = "true")]
    jitter: bool,
}

impl RetryPolicyBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_failures == Some(0) {
            return Err("max_failures must be at least 1".to_string());
        }
        Ok(())
    }
}

impl RetryPolicy {
    /// Start a builder with the defaults.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Policy from the `[retry]` configuration section.
    pub fn from_config(config: &RetryConfig) -> TaleweaverResult<Self> {
        let secs = |name: &str, value: f64| {
            Duration::try_from_secs_f64(value)
                .map_err(|e| ConfigError::for_key(format!("retry.{name}"), format!("= {value}: {e}")))
        };
        let policy = Self::builder()
            .max_failures(config.max_failures)
            .initial_delay(secs("initial_delay_secs", config.initial_delay_secs)?)
            .max_delay(secs("max_delay_secs", config.max_delay_secs)?)
            .quota_delay(secs("quota_delay_secs", config.quota_delay_secs)?)
            .invalid_request_penalty(config.invalid_request_penalty)
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid retry policy: {e}")))?;
        Ok(policy)
    }

    /// Budget charged for one failure of `class`.
    pub fn cost(&self, class: FailureClass) -> u32 {
        match class {
            FailureClass::InvalidRequest => 1 + self.invalid_request_penalty,
            _ => 1,
        }
    }

    /// Apply the random jitter factor, if enabled.
    pub fn jittered(&self, delay: Duration) -> Duration {
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        delay.mul_f64(rand::thread_rng().gen_range(0.5..1.5))
    }

    /// Unjittered delays: the initial delay, doubling up to the cap.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use taleweaver_retry::RetryPolicy;
    ///
    /// let policy = RetryPolicy::builder().build().unwrap();
    /// let secs: Vec<u64> = policy.backoff().take(5).map(|d| d.as_secs()).collect();
    /// assert_eq!(secs, [10, 20, 40, 60, 60]);
    /// ```
    pub fn backoff(&self) -> ExponentialBackoff {
        // base^n * factor with base 2 gives initial, 2 * initial, ...
        let half_initial = u64::try_from(self.initial_delay.as_millis() / 2).unwrap_or(u64::MAX);
        ExponentialBackoff::from_millis(2)
            .factor(half_initial)
            .max_delay(self.max_delay)
    }

    /// Jittered delay schedule handed to the retry loop.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        self.backoff().map(|delay| self.jittered(delay))
    }

    /// Delay overriding the schedule after a failure of `class`.
    ///
    /// Quota errors wait the quota delay; every other class follows the
    /// schedule.
    pub fn retry_after(&self, class: FailureClass) -> Option<Duration> {
        match class {
            FailureClass::QuotaExhausted => Some(self.jittered(self.quota_delay)),
            _ => None,
        }
    }
}

/// Failure accounting across attempts of one call.
///
/// # Examples
///
/// ```
/// use taleweaver_error::FailureClass;
/// use taleweaver_retry::{FailureBudget, RetryPolicy};
///
/// let policy = RetryPolicy::builder().max_failures(12u32).build().unwrap();
/// let mut budget = FailureBudget::new(&policy);
/// assert!(budget.charge(FailureClass::ServerError));
/// assert!(!budget.charge(FailureClass::InvalidRequest));
/// assert_eq!(budget.failures(), 12);
/// ```
#[derive(Debug, Clone)]
pub struct FailureBudget<'a> {
    policy: &'a RetryPolicy,
    failures: u32,
}

impl<'a> FailureBudget<'a> {
    /// Fresh accounting for `policy`.
    pub fn new(policy: &'a RetryPolicy) -> Self {
        Self { policy, failures: 0 }
    }

    /// Failures charged so far.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Charge one failure of `class`; false once the budget is spent.
    pub fn charge(&mut self, class: FailureClass) -> bool {
        self.failures = self.failures.saturating_add(self.policy.cost(class));
        self.failures < self.policy.max_failures
    }
}
