//! API error types for the fixture data client.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {status_code} - {message}")]
    Http { status_code: u16, message: String },

    #[error("Rate limited (retry after {retry_after}s)")]
    RateLimited { retry_after: u64 },

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Upstream rejected request: {0}")]
    Upstream(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Request failed after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

impl ApiError {
    /// Build an error from a non-success response.
    pub fn from_response(status_code: u16, body: &str) -> Self {
        if status_code == 429 {
            return Self::RateLimited {
                retry_after: DEFAULT_RETRY_AFTER_SECS,
            };
        }

        // Upstream sometimes wraps the reason as {"message": "..."}.
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| truncate(body, 200));

        Self::Http {
            status_code,
            message,
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Network(_) | Self::Timeout(_) => true,
            Self::Http { status_code, .. } => is_retryable_status(*status_code),
            _ => false,
        }
    }
}

/// Delay used when a 429 carries no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Statuses worth another attempt: rate limiting and transient server faults.
pub fn is_retryable_status(status_code: u16) -> bool {
    matches!(status_code, 429 | 500 | 502 | 503 | 504)
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        for code in [429, 500, 502, 503, 504] {
            assert!(is_retryable_status(code), "{code}");
        }
        for code in [400, 401, 403, 404, 501] {
            assert!(!is_retryable_status(code), "{code}");
        }
    }

    #[test]
    fn test_from_response() {
        let err = ApiError::from_response(429, "");
        assert!(matches!(err, ApiError::RateLimited { retry_after: 5 }));

        let err = ApiError::from_response(403, r#"{"message":"You are not subscribed"}"#);
        match &err {
            ApiError::Http { status_code, message } => {
                assert_eq!(*status_code, 403);
                assert_eq!(message, "You are not subscribed");
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = ApiError::from_response(503, "busy");
        assert!(matches!(err, ApiError::Http { status_code: 503, ref message } if message == "busy"));
        assert!(err.is_retryable());
        assert!(!ApiError::from_response(404, "").is_retryable());
    }

    #[test]
    fn test_missing_credential_not_retryable() {
        assert!(!ApiError::MissingCredential("API_FOOTBALL_KEY").is_retryable());
    }
}
