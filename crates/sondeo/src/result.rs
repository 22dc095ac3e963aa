//! Result and error types for Sondeo.

use thiserror::Error;

/// Result type for Sondeo operations
pub type SondeoResult<T> = Result<T, SondeoError>;

/// Errors that can occur in Sondeo
#[derive(Debug, Error)]
pub enum SondeoError {
    /// No node matched a locator before the timeout elapsed
    #[error("No element matching {locator} within {timeout_ms}ms")]
    NotFound {
        /// Display form of the locator (`by=selector`)
        locator: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element handle used after the page it belongs to navigated
    #[error("Stale element handle: {id}")]
    StaleElement {
        /// Handle id
        id: String,
    },

    /// Browser session reported an error
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Scenario check failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SondeoError {
    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this is the "nothing matched in time" condition
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_locator() {
        let err = SondeoError::NotFound {
            locator: "id=result-stats".to_string(),
            timeout_ms: 5000,
        };
        assert_eq!(
            err.to_string(),
            "No element matching id=result-stats within 5000ms"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_helpers() {
        assert!(matches!(
            SondeoError::session("gone"),
            SondeoError::Session { message } if message == "gone"
        ));
        assert!(!SondeoError::assertion("x").is_not_found());
        assert_eq!(
            SondeoError::config("bad").to_string(),
            "Configuration error: bad"
        );
    }

    #[test]
    fn test_io_conversion() {
        let err: SondeoError = std::io::Error::new(std::io::ErrorKind::NotFound, "nope").into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
