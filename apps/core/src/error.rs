use std::io;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
#[derive(Debug, Error)]
pub enum AppError {
    /// Represents errors originating from the database, typically from `sqlx`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents data validation errors (e.g., empty or oversized guest message).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents configuration-related errors (e.g., missing environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// No model provider is configured. Degrades to the local responder, never fails a request.
    #[error("Model provider is not configured")]
    ProviderUnconfigured,

    /// The model provider did not answer within the request deadline.
    #[error("Provider timed out: {0}")]
    ProviderTimeout(String),

    /// The provider account has exhausted its quota. Retryable by the operator, not the guest.
    #[error("Provider quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The provider throttled the request. Retryable after a delay.
    #[error("Provider rate limited: {0}")]
    RateLimited(String),

    /// The provider rejected our credentials. Operator-fatal.
    #[error("Provider authentication failed: {0}")]
    AuthFailed(String),

    /// The provider answered but the completion body was missing expected fields.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Transport-level failure reaching the provider (DNS, connect, 5xx).
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable outcome kind, surfaced to operator dashboards.
    /// Guests only ever see translated apology text, never these strings.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "storage_error",
            AppError::Io(_) => "io_error",
            AppError::Validation(_) => "invalid_input",
            AppError::Config(_) => "config_error",
            AppError::ProviderUnconfigured => "provider_unconfigured",
            AppError::ProviderTimeout(_) => "provider_timeout",
            AppError::QuotaExceeded(_) => "quota_exceeded",
            AppError::RateLimited(_) => "rate_limited",
            AppError::AuthFailed(_) => "auth_error",
            AppError::MalformedResponse(_) => "invalid_response",
            AppError::ProviderUnavailable(_) => "provider_unavailable",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Whether the caller may retry after a delay. Quota and throttling
    /// failures clear on their own; auth and validation failures do not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::QuotaExceeded(_)
                | AppError::RateLimited(_)
                | AppError::ProviderTimeout(_)
                | AppError::ProviderUnavailable(_)
        )
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::Database(e) => AppError::Database(sqlx::Error::Protocol(e.to_string())),
            AppError::Io(e) => AppError::Io(io::Error::new(e.kind(), e.to_string())),
            AppError::Validation(s) => AppError::Validation(s.clone()),
            AppError::Config(s) => AppError::Config(s.clone()),
            AppError::ProviderUnconfigured => AppError::ProviderUnconfigured,
            AppError::ProviderTimeout(s) => AppError::ProviderTimeout(s.clone()),
            AppError::QuotaExceeded(s) => AppError::QuotaExceeded(s.clone()),
            AppError::RateLimited(s) => AppError::RateLimited(s.clone()),
            AppError::AuthFailed(s) => AppError::AuthFailed(s.clone()),
            AppError::MalformedResponse(s) => AppError::MalformedResponse(s.clone()),
            AppError::ProviderUnavailable(s) => AppError::ProviderUnavailable(s.clone()),
            AppError::Internal(s) => AppError::Internal(s.clone()),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::ProviderTimeout(format!("Operation timed out: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(format!("UUID error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::Validation(format!("Date parse error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::ProviderTimeout(format!("HTTP timeout: {}", err))
        } else {
            AppError::ProviderUnavailable(format!("HTTP error: {}", err))
        }
    }
}
