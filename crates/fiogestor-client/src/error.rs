//! Client Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors from calls to the billing backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Backend answered non-2xx; message is the body's `error` field or the
    /// operation's generic fallback
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Client misconfiguration
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Check if this error is worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Api { status, .. } => *status >= 500,
            ApiError::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let server_side = ApiError::Api {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(server_side.is_retryable());

        let not_found = ApiError::Api {
            status: 404,
            message: "Plano não encontrado".into(),
        };
        assert!(!not_found.is_retryable());
        assert_eq!(not_found.to_string(), "Plano não encontrado");
    }
}
