//! Outbound call errors.

use thiserror::Error;

/// Errors from [`Provider`](crate::Provider) calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The resolved URL is not a valid absolute URI.
    #[error("invalid URI '{uri}': {reason}")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// Parser message.
        reason: String,
    },

    /// The request could not be delivered or no response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The response body is not the expected JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Creates an invalid URI error.
    pub fn invalid_uri(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

/// Result alias for outbound calls.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ClientError::invalid_uri("ht tp://x", "invalid uri character");
        assert_eq!(
            err.to_string(),
            "invalid URI 'ht tp://x': invalid uri character"
        );
        assert_eq!(
            ClientError::transport("connection refused").to_string(),
            "transport error: connection refused"
        );
    }
}
