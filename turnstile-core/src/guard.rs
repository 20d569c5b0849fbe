//! Login attempt guard for identifier-based lockout.
//!
//! Tracks consecutive failed logins per identifier (an IP address, a username,
//! or any composite key the caller chooses) and decides whether further
//! attempts should be allowed.
//!
//! # Features
//!
//! - Exact per-identifier failure counting under concurrent access
//! - Blocking once a configurable threshold is reached
//! - Failure window and lockout period after which the counter resets
//! - Reset on successful login and explicit operator unlock
//! - Background cleanup of expired records
//!
//! # Example
//!
//! ```rust
//! use turnstile_core::{LoginAttemptGuard, LoginGuardConfig};
//!
//! let guard = LoginAttemptGuard::new(LoginGuardConfig::default());
//!
//! // Check before verifying credentials
//! if guard.is_blocked("192.168.1.1") {
//!     // Reject with "too many attempts"
//! }
//!
//! // Report the outcome afterwards
//! guard.record_failed_attempt("192.168.1.1");
//! assert_eq!(guard.attempt_count("192.168.1.1"), 1);
//! assert_eq!(guard.remaining_attempts("192.168.1.1"), 4);
//! ```

use std::{fmt, sync::Arc};

use dashmap::DashMap;

use crate::{
    attempt::{AttemptRecord, LockoutStatus},
    clock::{Clock, SystemClock},
    config::LoginGuardConfig,
};

/// Tracks failed login attempts and makes the allow/block decision.
///
/// # Thread Safety
///
/// The guard is cheap to clone; clones share the same attempt table. Every
/// update to an identifier happens under that identifier's map shard lock, so
/// concurrent failures are never lost.
#[derive(Clone)]
pub struct LoginAttemptGuard {
    records: Arc<DashMap<String, AttemptRecord>>,
    config: Arc<LoginGuardConfig>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for LoginAttemptGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginAttemptGuard")
            .field("config", &self.config)
            .field("tracked_identifiers", &self.records.len())
            .finish()
    }
}

impl LoginAttemptGuard {
    /// Create a guard that reads the wall clock.
    pub fn new(config: LoginGuardConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: LoginGuardConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            config: Arc::new(config),
            clock,
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &LoginGuardConfig {
        &self.config
    }

    /// Check if attempt tracking is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Record a failed login attempt and return the updated status.
    ///
    /// Creates the record on the first failure. If the stored failures have
    /// expired, a new streak is started. When tracking is disabled nothing is
    /// recorded and a clear status is returned.
    pub fn record_failed_attempt(&self, identifier: &str) -> LockoutStatus {
        if !self.config.enabled {
            return LockoutStatus::clear(identifier, &self.config);
        }

        let now = self.clock.now();
        let (became_blocked, status) = {
            let mut record = self
                .records
                .entry(identifier.to_string())
                .or_insert_with(|| AttemptRecord::new(identifier, now));
            let became_blocked = record.register_failure(now, &self.config);
            (became_blocked, record.status(now, &self.config))
        };

        if became_blocked {
            tracing::warn!(
                identifier = %identifier,
                failed_attempts = status.failed_attempts,
                blocked_until = ?status.blocked_until,
                "Identifier blocked after too many failed login attempts"
            );
        } else {
            tracing::debug!(
                identifier = %identifier,
                failed_attempts = status.failed_attempts,
                remaining_attempts = status.remaining_attempts,
                "Recorded failed login attempt"
            );
        }

        status
    }

    /// Reserve an attempt before its outcome is known.
    ///
    /// Under the identifier's entry lock, refuses with the current status if
    /// the identifier is blocked, otherwise counts the attempt as a failure
    /// up front and returns the resulting status. Concurrent callers can never
    /// obtain more than `max_attempts` reservations per streak.
    ///
    /// Follow up with [`record_successful_attempt`](Self::record_successful_attempt)
    /// on success, nothing on failure, or [`release_attempt`](Self::release_attempt)
    /// if the outcome could not be determined.
    pub fn try_begin_attempt(&self, identifier: &str) -> Result<LockoutStatus, LockoutStatus> {
        if !self.config.enabled {
            return Ok(LockoutStatus::clear(identifier, &self.config));
        }

        let now = self.clock.now();
        let mut record = self
            .records
            .entry(identifier.to_string())
            .or_insert_with(|| AttemptRecord::new(identifier, now));

        if record.is_blocked(now, &self.config) {
            return Err(record.status(now, &self.config));
        }

        if record.register_failure(now, &self.config) {
            tracing::warn!(
                identifier = %identifier,
                failed_attempts = record.failure_count,
                "Identifier reached the failed login attempt limit"
            );
        }

        Ok(record.status(now, &self.config))
    }

    /// Undo a reservation from [`try_begin_attempt`](Self::try_begin_attempt)
    /// whose outcome is unknown.
    pub fn release_attempt(&self, identifier: &str) {
        if let Some(mut record) = self.records.get_mut(identifier) {
            record.release_failure(&self.config);
        }
    }

    /// Reset the failure count and clear any block after a successful login.
    ///
    /// No-op if the identifier has no record.
    pub fn record_successful_attempt(&self, identifier: &str) {
        if self.records.remove(identifier).is_some() {
            tracing::debug!(identifier = %identifier, "Cleared failed login attempts");
        }
    }

    /// Whether attempts for this identifier should currently be rejected.
    pub fn is_blocked(&self, identifier: &str) -> bool {
        if !self.config.enabled {
            return false;
        }

        let now = self.clock.now();
        self.records
            .get(identifier)
            .is_some_and(|record| record.is_blocked(now, &self.config))
    }

    /// Current number of consecutive failures, 0 if none are on record.
    pub fn attempt_count(&self, identifier: &str) -> u32 {
        if !self.config.enabled {
            return 0;
        }

        let now = self.clock.now();
        self.records
            .get(identifier)
            .map(|record| record.effective_failures(now, &self.config))
            .unwrap_or(0)
    }

    /// Failures left before the identifier is blocked.
    pub fn remaining_attempts(&self, identifier: &str) -> u32 {
        self.config
            .max_attempts
            .saturating_sub(self.attempt_count(identifier))
    }

    /// Full status for an identifier.
    pub fn lockout_status(&self, identifier: &str) -> LockoutStatus {
        if !self.config.enabled {
            return LockoutStatus::clear(identifier, &self.config);
        }

        let now = self.clock.now();
        match self.records.get(identifier) {
            Some(record) => record.status(now, &self.config),
            None => LockoutStatus::clear(identifier, &self.config),
        }
    }

    /// Clear an identifier regardless of its state (e.g. by an operator).
    ///
    /// Returns `true` if the identifier was blocked.
    pub fn unlock(&self, identifier: &str) -> bool {
        let now = self.clock.now();
        let was_blocked = self
            .records
            .remove(identifier)
            .is_some_and(|(_, record)| record.is_blocked(now, &self.config));

        if was_blocked {
            tracing::info!(identifier = %identifier, "Unlocked blocked identifier");
        }

        was_blocked
    }

    /// Remove every expired record. Returns the number removed.
    ///
    /// Blocked records are kept until their lockout ends; permanent blocks are
    /// never removed here.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.records.retain(|_, record| {
            let keep = !record.is_expired(now, &self.config);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of identifiers currently held in the attempt table.
    pub fn tracked_identifiers(&self) -> usize {
        self.records.len()
    }

    /// Start the background cleanup task.
    ///
    /// This spawns a task that calls [`sweep_expired`](Self::sweep_expired)
    /// every `cleanup_interval` until `shutdown` changes or its sender is dropped.
    /// Must be called within a Tokio runtime.
    pub fn start_cleanup_task(
        &self,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let guard = self.clone();
        let cleanup_interval = self.config.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(cleanup_interval);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let count = guard.sweep_expired();
                        if count > 0 {
                            tracing::info!(
                                count = count,
                                remaining = guard.tracked_identifiers(),
                                "Cleaned up expired login attempt records"
                            );
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down login attempt cleanup task");
                        break;
                    }
                }
            }
        })
    }
}
