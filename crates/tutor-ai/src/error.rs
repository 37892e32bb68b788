//! Error types for tutor-ai

use thiserror::Error;

/// Result type alias using tutor-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when calling the generation service
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error: {message} (type: {error_type})")]
    Api { error_type: String, message: String },

    /// No API key configured
    #[error("Gemini API key not configured. Set GOOGLE_API_KEY or GEMINI_API_KEY, or add api_key to the config file")]
    InvalidApiKey,

    /// Server-sent events error
    #[error("SSE error: {0}")]
    Sse(String),

    /// The service answered but the payload held no text
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Create an API error from type and message
    pub fn api(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Whether the failure came from missing credentials rather than from the
    /// service itself.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::InvalidApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let e = Error::api("INVALID_ARGUMENT", "API key not valid");
        assert_eq!(
            e.to_string(),
            "API error: API key not valid (type: INVALID_ARGUMENT)"
        );
    }

    #[test]
    fn test_configuration_errors() {
        assert!(Error::InvalidApiKey.is_configuration());
        assert!(!Error::Sse("connection reset".into()).is_configuration());
        assert!(!Error::EmptyResponse("no candidates".into()).is_configuration());
    }

    #[test]
    fn test_missing_key_mentions_env_vars() {
        let msg = Error::InvalidApiKey.to_string();
        assert!(msg.contains("GOOGLE_API_KEY"));
        assert!(msg.contains("GEMINI_API_KEY"));
    }
}
