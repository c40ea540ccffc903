//! Error types for the streaming client

use thiserror::Error;

/// Conditions that reject a submitted query.
///
/// Frame decode failures and dangling partial frames never show up here;
/// they are absorbed by the stream driver and only counted.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("API error: {status}")]
    Api { status: u16 },

    #[error("Response body is missing")]
    MissingBody,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatError {
    pub fn transport(msg: impl Into<String>) -> Self {
        ChatError::Transport(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        ChatError::Backend(msg.into())
    }

    /// Request failed outright or the response could not be read
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ChatError::Api { .. } | ChatError::MissingBody | ChatError::Transport(_) | ChatError::Http(_)
        )
    }

    /// The backend sent an `error` event mid-stream
    pub fn is_backend(&self) -> bool {
        matches!(self, ChatError::Backend(_))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(ChatError::Api { status: 502 }.to_string(), "API error: 502");
        assert_eq!(
            ChatError::backend("backend failure").to_string(),
            "Backend error: backend failure"
        );
        assert_eq!(ChatError::MissingBody.to_string(), "Response body is missing");
    }

    #[test]
    fn classification() {
        assert!(ChatError::Api { status: 500 }.is_transport());
        assert!(ChatError::MissingBody.is_transport());
        assert!(ChatError::transport("reset").is_transport());
        assert!(!ChatError::backend("x").is_transport());
        assert!(ChatError::backend("x").is_backend());
        assert!(!ChatError::Config("x".into()).is_backend());
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: ChatError = json_err.into();
        assert!(matches!(err, ChatError::Json(_)));
    }
}
