//! Builder pattern for constructing Turnstile instances
//!
//! # Example
//!
//! ```rust
//! use chrono::Duration;
//! use turnstile::TurnstileBuilder;
//!
//! let turnstile = TurnstileBuilder::new()
//!     .with_max_attempts(3)
//!     .with_lockout_period(Some(Duration::minutes(30)))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(turnstile.remaining_attempts("192.168.1.1"), 3);
//! ```

use std::sync::Arc;

use chrono::Duration;
use turnstile_core::{Clock, LoginGuardConfig, SystemClock};

use crate::{Turnstile, TurnstileError};

/// Builder for [`Turnstile`] instances.
///
/// # Defaults
///
/// - Enabled, 5 attempts
/// - 15 minute failure window
/// - 15 minute lockout
/// - Cleanup every 60 seconds
/// - Wall clock
pub struct TurnstileBuilder {
    config: LoginGuardConfig,
    clock: Arc<dyn Clock>,
}

impl Default for TurnstileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnstileBuilder {
    pub fn new() -> Self {
        Self {
            config: LoginGuardConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the whole guard configuration.
    pub fn with_config(mut self, config: LoginGuardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    /// Set how long failures count toward the threshold. `None` keeps them
    /// until a success or unlock.
    pub fn with_failure_window(mut self, window: Option<Duration>) -> Self {
        self.config.failure_window = window;
        self
    }

    /// Set how long a block lasts. `None` blocks until a success or unlock.
    pub fn with_lockout_period(mut self, period: Option<Duration>) -> Self {
        self.config.lockout_period = period;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: std::time::Duration) -> Self {
        self.config.cleanup_interval = interval;
        self
    }

    /// Turn attempt tracking on or off.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Use a different time source, e.g. a [`ManualClock`](turnstile_core::ManualClock) in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate the configuration and build the instance.
    pub fn build(self) -> Result<Turnstile, TurnstileError> {
        self.config.validate()?;

        tracing::debug!(
            enabled = self.config.enabled,
            max_attempts = self.config.max_attempts,
            failure_window = ?self.config.failure_window,
            lockout_period = ?self.config.lockout_period,
            "Building login attempt guard"
        );

        Ok(Turnstile::from_builder(self.config, self.clock))
    }
}
