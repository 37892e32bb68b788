//! Error types for tutor-core

use thiserror::Error;

/// Result type alias using tutor-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Ways a request can end without a result. All of them are terminal for the
/// request they belong to; retrying means starting a new one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input did not look like a math expression, no request was started
    #[error("Please enter a valid math equation.")]
    InputRejected,

    /// The generation client failed or ended abnormally
    #[error("Failed to process the equation: {0}")]
    GenerationFailed(String),

    /// The client finished without producing any text
    #[error("Could not get a response from the API.")]
    EmptyResult,
}

impl Error {
    /// Wrap an opaque client error message
    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationFailed(message.into())
    }
}

impl From<tutor_ai::Error> for Error {
    fn from(err: tutor_ai::Error) -> Self {
        match err {
            tutor_ai::Error::EmptyResponse(_) => Error::EmptyResult,
            other => Error::GenerationFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        assert_eq!(
            Error::InputRejected.to_string(),
            "Please enter a valid math equation."
        );
        assert_eq!(
            Error::generation("quota exceeded").to_string(),
            "Failed to process the equation: quota exceeded"
        );
    }

    #[test]
    fn test_client_error_conversion() {
        let err: Error = tutor_ai::Error::InvalidApiKey.into();
        match err {
            Error::GenerationFailed(msg) => assert!(msg.contains("API key")),
            other => panic!("unexpected: {other:?}"),
        }

        let err: Error = tutor_ai::Error::EmptyResponse("no text".into()).into();
        assert_eq!(err, Error::EmptyResult);
    }
}
