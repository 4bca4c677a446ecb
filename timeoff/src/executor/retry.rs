//! Retry configuration for optimistic-concurrency conflicts.
//!
//! Every knob is a `nutype` newtype validated at construction, so a
//! [`RetryPolicy`] loaded from a config file is either sane or rejected.

#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use std::time::Duration;

use nutype::nutype;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How many times a conflicting command is retried after its first attempt.
///
/// Between 0 (fail on the first conflict) and 10.
#[nutype(
    validate(less_or_equal = 10),
    default = 3,
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Default,
        Display,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct MaxRetries(u32);

/// Delay before the first retry, in milliseconds (1 to 10 000).
#[nutype(
    validate(greater_or_equal = 1, less_or_equal = 10_000),
    default = 10,
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Default,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct BaseDelayMs(u64);

/// Growth factor between consecutive retry delays (1.0 to 3.0).
#[nutype(
    validate(greater_or_equal = 1.0, less_or_equal = 3.0),
    default = 2.0,
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        PartialOrd,
        Default,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct BackoffMultiplier(f64);

/// Upper bound of a single retry delay before jitter, in milliseconds
/// (1 to 300 000).
#[nutype(
    validate(greater_or_equal = 1, less_or_equal = 300_000),
    default = 1_000,
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Default,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct MaxDelayMs(u64);

/// Exponential backoff with jitter for version conflicts.
///
/// Defaults to 3 retries starting at 10 ms, doubling up to 1 s. Missing
/// fields fall back to their defaults when deserializing.
///
/// ```rust,ignore
/// let policy = RetryPolicy::new()
///     .max_retries(MaxRetries::try_new(5)?)
///     .base_delay(BaseDelayMs::try_new(25)?);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    max_retries: MaxRetries,
    base_delay_ms: BaseDelayMs,
    backoff_multiplier: BackoffMultiplier,
    max_delay_ms: MaxDelayMs,
}

impl RetryPolicy {
    /// Policy with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many retries follow the first attempt.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: MaxRetries) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry.
    #[must_use]
    pub const fn base_delay(mut self, base_delay_ms: BaseDelayMs) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Set the growth factor between delays.
    #[must_use]
    pub const fn backoff_multiplier(mut self, multiplier: BackoffMultiplier) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set the cap applied before jitter.
    #[must_use]
    pub const fn max_delay(mut self, max_delay_ms: MaxDelayMs) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Retries allowed after the first attempt.
    pub fn retry_limit(&self) -> u32 {
        self.max_retries.into_inner()
    }

    /// Delay before retry number `attempt` (1-based), without jitter.
    ///
    /// `base * multiplier^(attempt - 1)`, capped at the maximum delay.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let base_ms = self.base_delay_ms.into_inner() as f64;
        let max_ms = self.max_delay_ms.into_inner() as f64;
        let delay_ms = (base_ms * self.backoff_multiplier.into_inner().powi(exponent)).min(max_ms);

        Duration::from_millis(delay_ms as u64)
    }

    /// Delay before retry number `attempt`, with ±20% jitter so contending
    /// writers spread out.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        add_jitter(self.backoff(attempt))
    }
}

fn add_jitter(delay: Duration) -> Duration {
    let jitter_factor = rand::rng().random_range(0.8..=1.2);
    let jittered_ms = (delay.as_millis() as f64 * jitter_factor) as u64;
    Duration::from_millis(jittered_ms)
}
