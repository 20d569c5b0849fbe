use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use turnstile_core::LoginAttemptGuard;

use crate::{
    error::LoginError, extractors::ClientAddress, types::IdentifierStrategy,
    verifier::CredentialVerifier,
};

/// Shared state for the login routes.
pub struct LoginState {
    pub guard: LoginAttemptGuard,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub strategy: IdentifierStrategy,
}

impl Clone for LoginState {
    fn clone(&self) -> Self {
        Self {
            guard: self.guard.clone(),
            verifier: self.verifier.clone(),
            strategy: self.strategy,
        }
    }
}

impl LoginState {
    pub fn new(guard: LoginAttemptGuard, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            guard,
            verifier,
            strategy: IdentifierStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: IdentifierStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Reject requests from blocked client IPs before they reach the handler.
///
/// The guard is consulted with the client IP as identifier, so this pairs
/// with [`IdentifierStrategy::ClientIp`].
pub async fn reject_blocked(
    State(guard): State<LoginAttemptGuard>,
    ClientAddress(ip): ClientAddress,
    request: Request,
    next: Next,
) -> Result<Response, LoginError> {
    let identifier = ip.to_string();
    let status = guard.lockout_status(&identifier);

    if status.is_blocked {
        tracing::debug!(identifier = %identifier, "Rejected request from blocked client");
        return Err(LoginError::TooManyAttempts {
            retry_after: status.retry_after_seconds,
        });
    }

    Ok(next.run(request).await)
}
