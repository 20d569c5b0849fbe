//! # Turnstile
//!
//! Turnstile protects login endpoints from brute-force attacks. It counts
//! consecutive failed attempts per identifier (client IP, username, or a
//! composite of both), blocks an identifier once it reaches a threshold, and
//! lets it back in after a successful login, an operator unlock, or when the
//! lockout period runs out.
//!
//! State lives in process memory. Expired records are evicted by a background
//! cleanup task.
//!
//! ## Example
//!
//! ```rust,no_run
//! use turnstile::TurnstileBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let turnstile = TurnstileBuilder::new().with_max_attempts(5).build()?;
//!     let cleanup = turnstile.start_cleanup();
//!
//!     if !turnstile.is_blocked("192.168.1.1") {
//!         // verify credentials, then report the outcome
//!         turnstile.record_failed_attempt("192.168.1.1");
//!     }
//!
//!     cleanup.shutdown().await?;
//!     Ok(())
//! }
//! ```
use std::sync::Arc;

use turnstile_core::{Clock, ConfigError};

mod builder;

pub use builder::TurnstileBuilder;

/// Re-export core types from turnstile_core
pub use turnstile_core::{
    AttemptRecord, LockoutStatus, LoginAttemptGuard, LoginGuardConfig, ManualClock, SystemClock,
};

/// Errors that can occur when building or running a Turnstile instance.
#[derive(Debug, thiserror::Error)]
pub enum TurnstileError {
    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// The background cleanup task panicked or was cancelled
    #[error("Cleanup task failed: {0}")]
    CleanupTask(String),
}

/// The main entry point: a configured login attempt guard.
#[derive(Debug, Clone)]
pub struct Turnstile {
    guard: LoginAttemptGuard,
}

impl Turnstile {
    /// Create an instance with the given configuration and the wall clock.
    pub fn new(config: LoginGuardConfig) -> Result<Self, TurnstileError> {
        TurnstileBuilder::new().with_config(config).build()
    }

    pub(crate) fn from_builder(config: LoginGuardConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            guard: LoginAttemptGuard::with_clock(config, clock),
        }
    }

    /// The underlying guard. Clone it to hand it to request handlers.
    pub fn guard(&self) -> &LoginAttemptGuard {
        &self.guard
    }

    pub fn config(&self) -> &LoginGuardConfig {
        self.guard.config()
    }

    pub fn record_failed_attempt(&self, identifier: &str) -> LockoutStatus {
        self.guard.record_failed_attempt(identifier)
    }

    pub fn record_successful_attempt(&self, identifier: &str) {
        self.guard.record_successful_attempt(identifier)
    }

    pub fn is_blocked(&self, identifier: &str) -> bool {
        self.guard.is_blocked(identifier)
    }

    pub fn attempt_count(&self, identifier: &str) -> u32 {
        self.guard.attempt_count(identifier)
    }

    pub fn remaining_attempts(&self, identifier: &str) -> u32 {
        self.guard.remaining_attempts(identifier)
    }

    pub fn lockout_status(&self, identifier: &str) -> LockoutStatus {
        self.guard.lockout_status(identifier)
    }

    pub fn unlock(&self, identifier: &str) -> bool {
        self.guard.unlock(identifier)
    }

    /// Spawn the periodic cleanup task. Must be called within a Tokio runtime.
    pub fn start_cleanup(&self) -> CleanupHandle {
        let (shutdown, receiver) = tokio::sync::watch::channel(false);
        let task = self.guard.start_cleanup_task(receiver);
        CleanupHandle { shutdown, task }
    }
}

/// Handle to a running cleanup task.
pub struct CleanupHandle {
    shutdown: tokio::sync::watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl CleanupHandle {
    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(self) -> Result<(), TurnstileError> {
        // The task may already be gone; the join below reports why
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|e| TurnstileError::CleanupTask(e.to_string()))
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
