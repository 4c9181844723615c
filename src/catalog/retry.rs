//! Retry logic with exponential backoff for transient catalog failures.
//!
//! When a catalog request fails, the error is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - Temporary failures that may succeed on retry
//! - [`FailureType::Permanent`] - Failures that won't succeed regardless of retries
//! - [`FailureType::NeedsAuth`] - Credentials rejected
//! - [`FailureType::RateLimited`] - Server rate limiting (retries with backoff)
//!
//! The [`RetryPolicy`] then decides whether to retry based on failure type
//! and attempt count, computing exponential backoff delays with jitter.
//! A server-provided `Retry-After` value takes precedence over the computed delay.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument, warn};

use super::CatalogError;

/// Default maximum attempts (including the initial one).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff (1 second).
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap (32 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Maximum jitter added to delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Maximum Retry-After value honored (1 hour).
const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

/// Classification of catalog failure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry (timeouts, 5xx).
    Transient,
    /// Permanent failure (404, malformed body, bad configuration).
    Permanent,
    /// Credentials rejected.
    NeedsAuth,
    /// Server rate limiting (HTTP 429).
    RateLimited,
}

/// Decision on whether to retry a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the request after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the request.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for retry behavior with exponential backoff.
///
/// # Delay Calculation
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt-1), max_delay) + jitter
/// ```
///
/// With defaults, delays are approximately 1s then 2s before attempts run out.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom settings.
    ///
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determines whether to retry after `attempt` (1-indexed) failed.
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        match failure_type {
            FailureType::Permanent => {
                return RetryDecision::DoNotRetry {
                    reason: "permanent failure - retry would not help".to_string(),
                };
            }
            FailureType::NeedsAuth => {
                return RetryDecision::DoNotRetry {
                    reason: "authentication rejected - retry would not help".to_string(),
                };
            }
            FailureType::Transient | FailureType::RateLimited => {}
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);

        // attempt 1 = 2^0 = 1x base
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * multiplier.powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + Self::calculate_jitter()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn calculate_jitter() -> Duration {
        let mut rng = rand::thread_rng();
        let jitter_ms = rng.gen_range(0..=MAX_JITTER.as_millis() as u64);
        Duration::from_millis(jitter_ms)
    }
}

/// Classifies a catalog error into a failure type for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | HTTP 408, 5xx, timeout, network | Transient |
/// | HTTP 429 | RateLimited |
/// | 401 / 403 / token rejection | NeedsAuth |
/// | 404, other 4xx, decode, config | Permanent |
#[instrument]
pub fn classify_error(error: &CatalogError) -> FailureType {
    match error {
        CatalogError::HttpStatus { status, .. } => classify_http_status(*status),
        CatalogError::Timeout { .. } | CatalogError::Network { .. } => FailureType::Transient,
        CatalogError::Auth { .. } => FailureType::NeedsAuth,
        CatalogError::NotFound { .. }
        | CatalogError::Decode { .. }
        | CatalogError::ForeignPageUrl { .. }
        | CatalogError::MissingCredentials { .. }
        | CatalogError::ClientBuild { .. } => FailureType::Permanent,
    }
}

#[allow(clippy::match_same_arms)]
fn classify_http_status(status: u16) -> FailureType {
    match status {
        408 => FailureType::Transient,
        429 => FailureType::RateLimited,
        401 | 403 => FailureType::NeedsAuth,
        status if (500..600).contains(&status) => FailureType::Transient,
        _ => FailureType::Permanent,
    }
}

/// Parses a `Retry-After` header value (integer seconds or HTTP-date).
///
/// Negative values and dates in the past yield `None`. Values above one hour
/// are capped.
#[must_use]
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    let header_value = header_value.trim();

    if let Ok(seconds) = header_value.parse::<i64>() {
        let Ok(seconds) = u64::try_from(seconds) else {
            debug!(seconds, "negative Retry-After value, ignoring");
            return None;
        };
        return Some(cap_retry_after(Duration::from_secs(seconds)));
    }

    let datetime = httpdate::parse_http_date(header_value).ok()?;
    let duration = datetime.duration_since(std::time::SystemTime::now()).ok()?;
    Some(cap_retry_after(duration))
}

fn cap_retry_after(duration: Duration) -> Duration {
    if duration > MAX_RETRY_AFTER {
        warn!(
            delay_secs = duration.as_secs(),
            max_secs = MAX_RETRY_AFTER.as_secs(),
            "Retry-After exceeds maximum, capping at 1 hour"
        );
        MAX_RETRY_AFTER
    } else {
        duration
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== RetryPolicy Tests ====================

    #[test]
    fn test_retry_policy_default_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(32));
        assert!((policy.backoff_multiplier - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_retry_policy_max_attempts_minimum_is_one() {
        assert_eq!(RetryPolicy::with_max_attempts(0).max_attempts(), 1);
        assert_eq!(
            RetryPolicy::new(0, Duration::ZERO, Duration::ZERO, 2.0).max_attempts(),
            1
        );
    }

    // ==================== Delay Calculation Tests ====================

    #[test]
    fn test_delay_calculation_doubles_per_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(32), 2.0);
        let first = policy.calculate_delay(1);
        assert!(first >= Duration::from_secs(1) && first <= Duration::from_millis(1500));
        let third = policy.calculate_delay(3);
        assert!(third >= Duration::from_secs(4) && third <= Duration::from_millis(4500));
    }

    #[test]
    fn test_delay_calculation_respects_max_delay() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(5), 2.0);
        let delay = policy.calculate_delay(6);
        assert!(delay >= Duration::from_secs(5));
        assert!(delay <= Duration::from_millis(5500));
    }

    #[test]
    fn test_jitter_within_bounds() {
        for _ in 0..100 {
            assert!(RetryPolicy::calculate_jitter() <= MAX_JITTER);
        }
    }

    // ==================== Error Classification Tests ====================

    #[test]
    fn test_classify_rate_limit_and_server_errors() {
        let error = CatalogError::from_status("u", 429, None);
        assert_eq!(classify_error(&error), FailureType::RateLimited);
        for status in [500, 502, 503, 504, 408] {
            let error = CatalogError::from_status("u", status, None);
            assert_eq!(classify_error(&error), FailureType::Transient, "{status}");
        }
    }

    #[test]
    fn test_classify_auth_and_not_found() {
        let error = CatalogError::from_status("u", 401, None);
        assert_eq!(classify_error(&error), FailureType::NeedsAuth);
        let error = CatalogError::from_status("u", 404, None);
        assert_eq!(classify_error(&error), FailureType::Permanent);
        let error = CatalogError::from_status("u", 400, None);
        assert_eq!(classify_error(&error), FailureType::Permanent);
    }

    #[test]
    fn test_classify_timeout_transient() {
        let error = CatalogError::Timeout {
            url: "u".to_string(),
        };
        assert_eq!(classify_error(&error), FailureType::Transient);
    }

    #[test]
    fn test_classify_decode_permanent() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = CatalogError::decode("u", source);
        assert_eq!(classify_error(&error), FailureType::Permanent);
    }

    // ==================== Should Retry Decision Tests ====================

    #[test]
    fn test_should_retry_permanent_and_auth_do_not_retry() {
        let policy = RetryPolicy::default();
        let RetryDecision::DoNotRetry { reason } = policy.should_retry(FailureType::Permanent, 1)
        else {
            panic!("permanent failures must not retry");
        };
        assert!(reason.contains("permanent"));
        assert!(matches!(
            policy.should_retry(FailureType::NeedsAuth, 1),
            RetryDecision::DoNotRetry { .. }
        ));
    }

    #[test]
    fn test_should_retry_respects_max_attempts() {
        let policy = RetryPolicy::with_max_attempts(3);
        assert!(matches!(
            policy.should_retry(FailureType::Transient, 1),
            RetryDecision::Retry { attempt: 2, .. }
        ));
        assert!(matches!(
            policy.should_retry(FailureType::RateLimited, 2),
            RetryDecision::Retry { attempt: 3, .. }
        ));
        let RetryDecision::DoNotRetry { reason } = policy.should_retry(FailureType::Transient, 3)
        else {
            panic!("attempt 3 of 3 must not retry");
        };
        assert!(reason.contains("exhausted"));
    }

    // ==================== Retry-After Tests ====================

    #[test]
    fn test_parse_retry_after_seconds() {
        assert_eq!(parse_retry_after("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_retry_after(" 0 "), Some(Duration::ZERO));
    }

    #[test]
    fn test_parse_retry_after_negative_and_garbage() {
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("soon"), None);
    }

    #[test]
    fn test_parse_retry_after_caps_at_one_hour() {
        assert_eq!(parse_retry_after("999999"), Some(MAX_RETRY_AFTER));
    }

    #[test]
    fn test_parse_retry_after_past_http_date_is_none() {
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }
}
