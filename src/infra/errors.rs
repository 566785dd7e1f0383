// src/infra/errors.rs — Error types for convoloop

use thiserror::Error;

use crate::provider::Role;

#[derive(Error, Debug)]
pub enum ConvoError {
    // Remote failures
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    #[error("Malformed response from '{provider}': {message}")]
    MalformedResponse { provider: String, message: String },

    // User errors
    #[error("No API key found. Set {var} in the environment.")]
    MissingApiKey { var: String },

    #[error("Configuration error: {0}")]
    Config(String),

    // Transcript invariants
    #[error("Transcript out of order: expected a {expected:?} message, got {found:?}")]
    TranscriptOrder { expected: Role, found: Role },

    // Infra
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvoError {
    /// True for failures that came back from the completion service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ConvoError::Provider { .. } | ConvoError::MalformedResponse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let e = ConvoError::Provider {
            provider: "openai".into(),
            message: "HTTP 401: bad key".into(),
        };
        assert_eq!(e.to_string(), "Provider 'openai' error: HTTP 401: bad key");
        assert!(e.is_remote());
    }

    #[test]
    fn test_malformed_is_remote() {
        let e = ConvoError::MalformedResponse {
            provider: "openai".into(),
            message: "missing choices[0]".into(),
        };
        assert!(e.is_remote());
    }

    #[test]
    fn test_io_is_not_remote() {
        let e = ConvoError::from(std::io::Error::other("disk full"));
        assert!(!e.is_remote());
        assert!(e.to_string().contains("disk full"));
    }

    #[test]
    fn test_order_error_display() {
        let e = ConvoError::TranscriptOrder {
            expected: Role::Assistant,
            found: Role::User,
        };
        assert!(e.to_string().contains("Assistant"));
    }
}
