//! Lookup error types

use std::time::Duration;

/// Errors that can occur while a backend resolves a query to candidates.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The backend has no credential to call the geocoding service with.
    #[error("Geocoding credential is not configured")]
    NotConfigured,

    /// HTTP error response from the geocoding service.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Network error during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the service response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

impl LookupError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the failure comes from missing configuration rather
    /// than from the service.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NotConfigured)
    }

    /// Returns `true` if repeating the same lookup could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Network(_) => true,
            Self::Timeout(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(LookupError::NotConfigured.is_configuration());
        assert!(!LookupError::NotConfigured.is_retryable());

        let unauthorized = LookupError::http(401, "Not Authorized - Invalid Token");
        assert_eq!(unauthorized.status_code(), Some(401));
        assert!(!unauthorized.is_retryable());

        assert!(LookupError::http(503, "unavailable").is_retryable());
        assert!(LookupError::Timeout(Duration::from_secs(5)).is_retryable());
        assert!(!LookupError::parse_with_body("expected object", "[]").is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LookupError::http(404, "Not Found").to_string(),
            "HTTP 404: Not Found"
        );
    }
}
