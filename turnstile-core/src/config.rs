//! Configuration for login attempt tracking.

use chrono::Duration;

use crate::error::ConfigError;

/// Default number of consecutive failures before an identifier is blocked.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Longest accepted failure window or lockout period, in days.
pub const MAX_PERIOD_DAYS: i64 = 365 * 100;

/// Configuration for [`LoginAttemptGuard`](crate::LoginAttemptGuard).
///
/// The defaults block an identifier for 15 minutes after 5 consecutive failures,
/// and forget failures that are older than 15 minutes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGuardConfig {
    /// Whether attempts are tracked at all.
    pub enabled: bool,

    /// Number of consecutive failures that blocks an identifier.
    pub max_attempts: u32,

    /// Failures older than this no longer count toward the threshold.
    ///
    /// `None` keeps failures until a success or an explicit unlock.
    pub failure_window: Option<Duration>,

    /// How long a block lasts, measured from the latest failure.
    ///
    /// `None` blocks until a success or an explicit unlock.
    pub lockout_period: Option<Duration>,

    /// How often the background cleanup task evicts expired records.
    pub cleanup_interval: std::time::Duration,
}

impl Default for LoginGuardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            failure_window: Some(Duration::minutes(15)),
            lockout_period: Some(Duration::minutes(15)),
            cleanup_interval: std::time::Duration::from_secs(60),
        }
    }
}

impl LoginGuardConfig {
    /// A configuration that never records attempts or blocks anyone.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Counter-and-threshold only: failures never age out and a block only
    /// lifts on a successful attempt or an explicit unlock.
    pub fn permanent(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            failure_window: None,
            lockout_period: None,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroMaxAttempts);
        }

        for (field, value) in [
            ("failure_window", self.failure_window),
            ("lockout_period", self.lockout_period),
        ] {
            match value {
                Some(d) if d <= Duration::zero() => {
                    return Err(ConfigError::NonPositiveDuration { field });
                }
                Some(d) if d > Duration::days(MAX_PERIOD_DAYS) => {
                    return Err(ConfigError::DurationTooLong { field });
                }
                _ => {}
            }
        }

        if self.cleanup_interval.is_zero() {
            return Err(ConfigError::NonPositiveDuration {
                field: "cleanup_interval",
            });
        }

        Ok(())
    }
}
