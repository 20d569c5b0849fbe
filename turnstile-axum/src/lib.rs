//! # Turnstile Axum Integration
//!
//! This crate provides Axum routes and middleware that put the turnstile
//! login attempt guard in front of your credential check.
//!
//! ## Features
//!
//! - **Login route**: checks the guard, verifies credentials through your
//!   [`CredentialVerifier`], and reports the outcome back to the guard
//! - **Blocking middleware**: rejects blocked client IPs on any route with
//!   `429 Too Many Requests` and a `Retry-After` header
//! - **Admin routes**: inspect and clear lockouts
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::{net::SocketAddr, sync::Arc};
//! use turnstile_core::{LoginAttemptGuard, LoginGuardConfig};
//! use turnstile_axum::{LoginState, StaticCredentials};
//!
//! #[tokio::main]
//! async fn main() {
//!     let guard = LoginAttemptGuard::new(LoginGuardConfig::default());
//!     let verifier = Arc::new(StaticCredentials::new().with_user("alice", "hunter2"));
//!
//!     let app = axum::Router::new().nest(
//!         "/auth",
//!         turnstile_axum::routes(LoginState::new(guard, verifier)).build(),
//!     );
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(
//!         listener,
//!         app.into_make_service_with_connect_info::<SocketAddr>(),
//!     )
//!     .await
//!     .unwrap();
//! }
//! ```

mod error;
mod extractors;
mod middleware;
mod routes;
mod types;
mod verifier;

pub use error::{LoginError, Result};
pub use extractors::{ClientAddress, TrustForwardedHeaders};
pub use middleware::{LoginState, reject_blocked};
pub use routes::{admin_router, create_router};
pub use types::{
    HealthResponse, IdentifierStrategy, LoginRequest, LoginResponse, UnlockResponse,
};
pub use verifier::{CredentialVerifier, StaticCredentials};

use axum::Router;

/// Create login routes for your Axum application.
///
/// # Example
///
/// ```rust,ignore
/// let auth_routes = turnstile_axum::routes(state).with_admin_routes(true).build();
/// let app = Router::new().nest("/auth", auth_routes);
/// ```
pub fn routes(state: LoginState) -> LoginRouterBuilder {
    LoginRouterBuilder {
        state,
        admin_routes: false,
    }
}

/// Builder for configuring login routes
pub struct LoginRouterBuilder {
    state: LoginState,
    admin_routes: bool,
}

impl LoginRouterBuilder {
    /// Set the identifier strategy used by the login route
    pub fn with_strategy(mut self, strategy: IdentifierStrategy) -> Self {
        self.state = self.state.with_strategy(strategy);
        self
    }

    /// Include the unauthenticated lockout admin routes
    pub fn with_admin_routes(mut self, enabled: bool) -> Self {
        self.admin_routes = enabled;
        self
    }

    /// Build the router with the configured options
    pub fn build(self) -> Router {
        let router = create_router(self.state.clone());

        if self.admin_routes {
            router.merge(admin_router(self.state))
        } else {
            router
        }
    }
}

impl From<LoginRouterBuilder> for Router {
    fn from(builder: LoginRouterBuilder) -> Self {
        builder.build()
    }
}
