//! Error handling for LivIntake
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for LivIntake application
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("SMS delivery error: {0}")]
    Delivery(#[from] TwilioError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Logging setup error: {0}")]
    Logging(String),
}

/// Twilio API specific errors
#[derive(Error, Debug)]
pub enum TwilioError {
    #[error("Twilio API returned HTTP {status}: {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("Twilio API timeout")]
    Timeout,

    #[error("Twilio service unavailable")]
    ServiceUnavailable,

    #[error("Twilio API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid Twilio response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for LivIntake operations
pub type Result<T> = std::result::Result<T, IntakeError>;

/// Result type alias for Twilio operations
pub type TwilioResult<T> = std::result::Result<T, TwilioError>;

impl IntakeError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            IntakeError::Config(_) => false,
            IntakeError::ConfigSource(_) => false,
            IntakeError::Delivery(e) => e.is_transient(),
            IntakeError::Http(_) => true,
            IntakeError::Io(_) => true,
            IntakeError::UrlParse(_) => false,
            IntakeError::Logging(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            IntakeError::Config(_) => ErrorSeverity::Critical,
            IntakeError::ConfigSource(_) => ErrorSeverity::Critical,
            IntakeError::Logging(_) => ErrorSeverity::Critical,
            IntakeError::Delivery(TwilioError::Timeout) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }
}

impl TwilioError {
    /// Whether a later attempt at the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            TwilioError::Api { status, .. } => *status == 429 || *status >= 500,
            TwilioError::Timeout => true,
            TwilioError::ServiceUnavailable => true,
            TwilioError::RequestFailed(_) => true,
            TwilioError::InvalidResponse(_) => false,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_fatal() {
        let err = IntakeError::Config("Missing TWILIO_AUTH_TOKEN".to_string());
        assert!(!err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.to_string(), "Configuration error: Missing TWILIO_AUTH_TOKEN");
    }

    #[test]
    fn test_delivery_error_recoverability() {
        let rejected: IntakeError = TwilioError::Api {
            status: 400,
            code: Some(21211),
            message: "The 'To' number is not a valid phone number.".to_string(),
        }
        .into();
        assert!(!rejected.is_recoverable());
        assert_eq!(rejected.severity(), ErrorSeverity::Error);

        let throttled: IntakeError = TwilioError::Api {
            status: 429,
            code: Some(20429),
            message: "Too Many Requests".to_string(),
        }
        .into();
        assert!(throttled.is_recoverable());

        let timeout: IntakeError = TwilioError::Timeout.into();
        assert!(timeout.is_recoverable());
        assert_eq!(timeout.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
    }
}
