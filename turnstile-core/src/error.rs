use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_attempts must be at least 1")]
    ZeroMaxAttempts,

    #[error("{field} must be a positive duration")]
    NonPositiveDuration { field: &'static str },

    #[error("{field} must not exceed 100 years")]
    DurationTooLong { field: &'static str },
}

impl Error {
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::Config(ConfigError::ZeroMaxAttempts);
        assert_eq!(
            error.to_string(),
            "Configuration error: max_attempts must be at least 1"
        );

        let error = Error::Config(ConfigError::NonPositiveDuration {
            field: "lockout_period",
        });
        assert_eq!(
            error.to_string(),
            "Configuration error: lockout_period must be a positive duration"
        );
    }

    #[test]
    fn test_error_from_conversions() {
        let error: Error = ConfigError::ZeroMaxAttempts.into();
        assert!(error.is_config_error());
        assert!(matches!(error, Error::Config(ConfigError::ZeroMaxAttempts)));
    }
}
