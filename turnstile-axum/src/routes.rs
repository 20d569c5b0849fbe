use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    error::{LoginError, Result},
    extractors::ClientAddress,
    middleware::LoginState,
    types::*,
};

/// Login and health routes.
pub fn create_router(state: LoginState) -> Router {
    Router::new()
        .route("/login", post(login_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Operator routes for inspecting and clearing lockouts.
///
/// These are not protected; mount them behind your own authorization.
pub fn admin_router(state: LoginState) -> Router {
    Router::new()
        .route(
            "/lockout/{identifier}",
            get(lockout_status_handler).delete(unlock_handler),
        )
        .with_state(state)
}

async fn health_handler(State(state): State<LoginState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tracked_identifiers: state.guard.tracked_identifiers(),
    })
}

async fn login_handler(
    State(state): State<LoginState>,
    ClientAddress(ip): ClientAddress,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    if request.username.trim().is_empty() {
        return Err(LoginError::BadRequest("username is required".to_string()));
    }

    let identifier = state.strategy.identifier(ip, &request.username);

    // Count the attempt before touching credentials so concurrent requests
    // cannot exceed the limit
    let reserved = state.guard.try_begin_attempt(&identifier).map_err(|blocked| {
        tracing::info!(identifier = %identifier, "Rejected login attempt from blocked identifier");
        LoginError::TooManyAttempts {
            retry_after: blocked.retry_after_seconds,
        }
    })?;

    let valid = match state
        .verifier
        .verify(&request.username, &request.password)
        .await
    {
        Ok(valid) => valid,
        Err(e) => {
            state.guard.release_attempt(&identifier);
            return Err(e);
        }
    };

    if valid {
        state.guard.record_successful_attempt(&identifier);
        tracing::info!(identifier = %identifier, "Successful login");

        return Ok(Json(LoginResponse {
            username: request.username,
            message: "Login successful".to_string(),
        }));
    }

    tracing::debug!(
        identifier = %identifier,
        failed_attempts = reserved.failed_attempts,
        "Failed login attempt"
    );

    if reserved.is_blocked {
        Err(LoginError::TooManyAttempts {
            retry_after: reserved.retry_after_seconds,
        })
    } else {
        Err(LoginError::InvalidCredentials {
            remaining_attempts: reserved.remaining_attempts,
        })
    }
}

async fn lockout_status_handler(
    State(state): State<LoginState>,
    Path(identifier): Path<String>,
) -> impl IntoResponse {
    Json(state.guard.lockout_status(&identifier))
}

async fn unlock_handler(
    State(state): State<LoginState>,
    Path(identifier): Path<String>,
) -> impl IntoResponse {
    let was_blocked = state.guard.unlock(&identifier);

    Json(UnlockResponse {
        identifier,
        was_blocked,
    })
}
