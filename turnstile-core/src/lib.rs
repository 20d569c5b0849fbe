//! Core functionality for the turnstile project
//!
//! This crate tracks failed login attempts per identifier and decides whether
//! further attempts should be blocked.
//!
//! See [`LoginAttemptGuard`] for the guard itself and [`LoginGuardConfig`] for
//! its thresholds and expiry settings.
//!
pub mod attempt;
pub mod clock;
pub mod config;
pub mod error;
pub mod guard;

pub use attempt::{AttemptRecord, LockoutStatus};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DEFAULT_MAX_ATTEMPTS, LoginGuardConfig, MAX_PERIOD_DAYS};
pub use error::{ConfigError, Error};
pub use guard::LoginAttemptGuard;
