//! Server and configuration error types.
//!
//! Neither of these ever reaches a client. Per-request failures are turned
//! into responses by the pipeline; these cover startup and configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to assemble a [`ServerConfig`](crate::ServerConfig) from its
/// layers.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required TOML file does not exist.
    #[error("config file {} does not exist", path.display())]
    Missing {
        /// Requested location.
        path: PathBuf,
    },

    /// A TOML file exists but could not be read.
    #[error("cannot read config file {}", path.display())]
    Read {
        /// Requested location.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: io::Error,
    },

    /// TOML content does not fit the server schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A recognized environment variable holds an unusable value.
    #[error("{var}: {reason}")]
    InvalidEnv {
        /// Full variable name, prefix included.
        var: String,
        /// What was expected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid_env(var: &str, reason: &str) -> Self {
        Self::InvalidEnv {
            var: var.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors returned by [`Server::start`](crate::Server::start).
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind to {addr}")]
    Bind {
        /// The configured `host:port`.
        addr: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// `start` was called on a server that is already running.
    #[error("server has already been started")]
    AlreadyStarted,

    /// `start` was called after `stop`.
    #[error("server has been stopped")]
    Stopped,

    /// I/O error while serving.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::Missing {
            path: PathBuf::from("/etc/portico.toml"),
        };
        assert_eq!(err.to_string(), "config file /etc/portico.toml does not exist");

        let err = ConfigError::invalid_env("PORTICO_PORT", "expected a port number");
        assert_eq!(err.to_string(), "PORTICO_PORT: expected a port number");
    }

    #[test]
    fn test_server_error_source() {
        use std::error::Error as _;

        let err = ServerError::Bind {
            addr: "0.0.0.0:80".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to bind to 0.0.0.0:80");
        assert!(err.source().is_some());
    }
}
