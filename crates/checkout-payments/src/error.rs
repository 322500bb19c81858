//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// No verified caller identity
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Missing or unrecognized input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Caller is authenticated but may not touch the resource
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Unexpected failure, already normalized for callers
    #[error("Internal error: {0}")]
    Internal(String),

    /// Stripe API error
    #[error("Stripe error: {0}")]
    Provider(String),

    /// Webhook signature verification failed
    #[error("Webhook signature invalid: {0}")]
    SignatureVerification(String),

    /// Webhook payload parsing failed
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error kinds that may be reported to a caller as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Unauthenticated,
    InvalidArgument,
    PermissionDenied,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidArgument => "invalid-argument",
            Self::PermissionDenied => "permission-denied",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PaymentError {
    /// Caller-facing code, or `None` if the error has not been classified yet.
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Unauthenticated(_) => Some(ErrorCode::Unauthenticated),
            Self::InvalidArgument(_) => Some(ErrorCode::InvalidArgument),
            Self::PermissionDenied(_) => Some(ErrorCode::PermissionDenied),
            Self::Internal(_) => Some(ErrorCode::Internal),
            _ => None,
        }
    }

    /// Keep classified errors unchanged, replace anything else with `Internal(message)`.
    #[must_use]
    pub fn or_internal(self, message: impl Into<String>) -> Self {
        if self.code().is_some() {
            self
        } else {
            Self::Internal(message.into())
        }
    }

    /// Inner message without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthenticated(msg)
            | Self::InvalidArgument(msg)
            | Self::PermissionDenied(msg)
            | Self::Internal(msg)
            | Self::Provider(msg)
            | Self::SignatureVerification(msg)
            | Self::WebhookParse(msg)
            | Self::Storage(msg)
            | Self::Config(msg) => msg,
        }
    }
}
