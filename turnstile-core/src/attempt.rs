//! Per-identifier attempt state and the lockout status derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LoginGuardConfig;

/// Failure history for a single identifier.
///
/// Records are created lazily on the first failure and removed on success,
/// unlock, or when the cleanup sweep finds them expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub identifier: String,
    pub failure_count: u32,
    pub blocked_until: Option<DateTime<Utc>>,
    pub first_failure_at: DateTime<Utc>,
    pub last_attempt_at: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn new(identifier: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.into(),
            failure_count: 0,
            blocked_until: None,
            first_failure_at: now,
            last_attempt_at: now,
        }
    }

    /// Whether the stored failures no longer count at `now`.
    ///
    /// A blocked record expires when its lockout ends; a permanent block never
    /// expires. Below the threshold, the record expires once the failure window
    /// has passed since the latest attempt.
    pub fn is_expired(&self, now: DateTime<Utc>, config: &LoginGuardConfig) -> bool {
        if self.failure_count >= config.max_attempts {
            return self.blocked_until.is_some_and(|until| until <= now);
        }

        config
            .failure_window
            .is_some_and(|window| now - self.last_attempt_at > window)
    }

    /// The failure count as seen at `now`, taking expiry into account.
    pub fn effective_failures(&self, now: DateTime<Utc>, config: &LoginGuardConfig) -> u32 {
        if self.is_expired(now, config) {
            0
        } else {
            self.failure_count
        }
    }

    pub fn is_blocked(&self, now: DateTime<Utc>, config: &LoginGuardConfig) -> bool {
        self.effective_failures(now, config) >= config.max_attempts
    }

    /// Apply a failed attempt at `now`.
    ///
    /// Returns `true` if this failure moved the identifier from allowed to blocked.
    pub fn register_failure(&mut self, now: DateTime<Utc>, config: &LoginGuardConfig) -> bool {
        if self.is_expired(now, config) {
            self.failure_count = 0;
            self.blocked_until = None;
            self.first_failure_at = now;
        }

        let was_blocked = self.failure_count >= config.max_attempts;

        self.failure_count = self.failure_count.saturating_add(1);
        self.last_attempt_at = now;

        if self.failure_count >= config.max_attempts {
            // A lockout that runs past the representable range never lifts on its own
            self.blocked_until = config
                .lockout_period
                .and_then(|period| now.checked_add_signed(period));
        }

        !was_blocked && self.failure_count >= config.max_attempts
    }

    /// Take back one failure that was counted before its outcome was known.
    pub fn release_failure(&mut self, config: &LoginGuardConfig) {
        self.failure_count = self.failure_count.saturating_sub(1);
        if self.failure_count < config.max_attempts {
            self.blocked_until = None;
        }
    }

    pub fn status(&self, now: DateTime<Utc>, config: &LoginGuardConfig) -> LockoutStatus {
        let failed_attempts = self.effective_failures(now, config);
        LockoutStatus::compute(&self.identifier, failed_attempts, self.blocked_until, now, config)
    }
}

/// Snapshot of an identifier's standing with the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutStatus {
    pub identifier: String,
    pub failed_attempts: u32,
    pub remaining_attempts: u32,
    pub is_blocked: bool,
    /// When the block lifts. `None` if not blocked or blocked until explicitly cleared.
    pub blocked_until: Option<DateTime<Utc>>,
    /// Whole seconds until the block lifts, rounded up.
    pub retry_after_seconds: Option<u64>,
}

impl LockoutStatus {
    /// Status for an identifier with no failures on record.
    pub fn clear(identifier: &str, config: &LoginGuardConfig) -> Self {
        Self {
            identifier: identifier.to_string(),
            failed_attempts: 0,
            remaining_attempts: config.max_attempts,
            is_blocked: false,
            blocked_until: None,
            retry_after_seconds: None,
        }
    }

    fn compute(
        identifier: &str,
        failed_attempts: u32,
        blocked_until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        config: &LoginGuardConfig,
    ) -> Self {
        if failed_attempts < config.max_attempts {
            return Self {
                identifier: identifier.to_string(),
                failed_attempts,
                remaining_attempts: config.max_attempts - failed_attempts,
                is_blocked: false,
                blocked_until: None,
                retry_after_seconds: None,
            };
        }

        let retry_after_seconds = blocked_until.map(|until| {
            let millis = (until - now).num_milliseconds().max(0) as u64;
            millis.div_ceil(1000)
        });

        Self {
            identifier: identifier.to_string(),
            failed_attempts,
            remaining_attempts: 0,
            is_blocked: true,
            blocked_until,
            retry_after_seconds,
        }
    }

    /// Time until the block lifts, if it lifts on its own.
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        self.retry_after_seconds.map(std::time::Duration::from_secs)
    }
}
