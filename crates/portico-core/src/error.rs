//! Errors produced by the request pipeline itself.
//!
//! Every variant is handled at the stage that detects it and converted
//! straight into a terminal response via [`DispatchError::into_response`].
//! Handlers, middleware, and interceptors never see these; they signal
//! their own failures by building an error response.
//!
//! | Variant | Status |
//! |---|---|
//! | `RouteNotFound` | 404 |
//! | `MethodNotAllowed` | 405 |
//! | `PublicDirMissing` | 404 |
//! | `ExtensionNotAllowed` | 404 |
//! | `FileNotFound` | 404 |
//! | `NoExtension` | 404 |

use http::header::{HeaderValue, ALLOW};
use http::{Method, StatusCode};
use thiserror::Error;

use crate::types::{Response, ResponseExt};

/// A failure detected while dispatching a request.
///
/// The `Display` text is the human-readable message placed in the error
/// response body.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No route pattern matched the request path.
    #[error("route not found")]
    RouteNotFound,

    /// The first route matching the path does not accept the request method.
    ///
    /// The response carries an `Allow` header naming `allowed`.
    #[error("method not allowed")]
    MethodNotAllowed {
        /// The method the matching route accepts.
        allowed: Method,
    },

    /// A static asset was requested but no public directory is configured.
    #[error("public folder is not defined")]
    PublicDirMissing,

    /// The requested asset's extension is not in the allow list.
    #[error("file extension is not allowed")]
    ExtensionNotAllowed {
        /// The rejected extension.
        extension: String,
    },

    /// The asset could not be read from the public directory.
    #[error("file not found")]
    FileNotFound {
        /// Underlying I/O failure, if the read was attempted.
        #[source]
        source: Option<std::io::Error>,
    },

    /// The static resolver was given a path without an extension.
    #[error("extension not found")]
    NoExtension,
}

impl DispatchError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::RouteNotFound
            | Self::PublicDirMissing
            | Self::ExtensionNotAllowed { .. }
            | Self::FileNotFound { .. }
            | Self::NoExtension => StatusCode::NOT_FOUND,
        }
    }

    /// Returns `true` if this error came from static asset resolution.
    #[must_use]
    pub fn is_static(&self) -> bool {
        !matches!(self, Self::RouteNotFound | Self::MethodNotAllowed { .. })
    }

    /// Converts the error into a `text/plain` response whose body is
    /// `Error: <message>`.
    #[must_use]
    pub fn into_response(self) -> Response {
        let allow = match &self {
            Self::MethodNotAllowed { allowed } => HeaderValue::from_str(allowed.as_str()).ok(),
            _ => None,
        };

        let mut response = Response::text(self.status_code(), format!("Error: {self}"));
        if let Some(allow) = allow {
            response.headers_mut().insert(ALLOW, allow);
        }
        response
    }
}

impl From<DispatchError> for Response {
    fn from(error: DispatchError) -> Self {
        error.into_response()
    }
}
