use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Too many failed login attempts")]
    TooManyAttempts { retry_after: Option<u64> },

    #[error("Invalid credentials")]
    InvalidCredentials { remaining_attempts: u32 },

    #[error("Client address could not be determined")]
    MissingClientAddress,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl LoginError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LoginError::TooManyAttempts { .. } => StatusCode::TOO_MANY_REQUESTS,
            LoginError::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            LoginError::MissingClientAddress | LoginError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            LoginError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            LoginError::TooManyAttempts { retry_after } => json!({
                "error": self.to_string(),
                "code": status.as_u16(),
                "retry_after_seconds": retry_after,
            }),
            LoginError::InvalidCredentials { remaining_attempts } => json!({
                "error": self.to_string(),
                "code": status.as_u16(),
                "remaining_attempts": remaining_attempts,
            }),
            // Internal details stay in the logs
            LoginError::Internal(msg) => {
                tracing::error!(error = %msg, "Login request failed");
                json!({
                    "error": "Internal server error",
                    "code": status.as_u16(),
                })
            }
            _ => json!({
                "error": self.to_string(),
                "code": status.as_u16(),
            }),
        };

        let mut response = (status, Json(body)).into_response();

        if let LoginError::TooManyAttempts {
            retry_after: Some(seconds),
        } = self
        {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}

pub type Result<T> = std::result::Result<T, LoginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_attempts_sets_retry_after() {
        let response = LoginError::TooManyAttempts {
            retry_after: Some(120),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "120");
    }

    #[test]
    fn test_permanent_block_has_no_retry_after() {
        let response = LoginError::TooManyAttempts { retry_after: None }.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            LoginError::InvalidCredentials {
                remaining_attempts: 2
            }
            .status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            LoginError::MissingClientAddress.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LoginError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
