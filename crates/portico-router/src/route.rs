//! A single route: pattern, method, and handler.

use std::fmt;
use std::sync::Arc;

use http::Method;
use portico_core::{BoxFuture, Request, Response};

use crate::handler::{BoxedHandler, Handler, HandlerParams};
use crate::params::Params;
use crate::pattern::{PathPattern, PatternError};

/// A registered route.
///
/// Path matching and method matching are independent predicates; the
/// [`Router`](crate::Router) combines them.
///
/// # Example
///
/// ```rust
/// use portico_core::{Response, ResponseExt};
/// use portico_router::{HandlerParams, Route};
/// use http::{Method, StatusCode};
///
/// let route = Route::new("/:id", |_: HandlerParams| async {
///     Response::text(StatusCode::OK, "ok")
/// })
/// .unwrap();
///
/// assert!(route.match_path("/1").is_some());
/// assert!(route.match_method(&Method::GET));
/// assert!(!route.match_method(&Method::POST));
/// ```
#[derive(Clone)]
pub struct Route {
    pattern: PathPattern,
    method: Method,
    handler: BoxedHandler,
}

impl Route {
    /// Creates a `GET` route.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if `path` is not a valid pattern.
    pub fn new(path: &str, handler: impl Handler) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: PathPattern::parse(path)?,
            method: Method::GET,
            handler: Arc::new(handler),
        })
    }

    /// Replaces the method this route accepts.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Returns the raw pattern string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns the compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Returns the accepted method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Matches the request path, returning captured parameters on success.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Params> {
        self.pattern.matches(path)
    }

    /// Strict method comparison. No aliasing and no case folding, so an
    /// extension method spelled `get` never equals `GET`.
    #[must_use]
    pub fn match_method(&self, method: &Method) -> bool {
        self.method == *method
    }

    /// Invokes the handler for `path`.
    ///
    /// Parameters are re-derived from `path`. Callers are expected to have
    /// confirmed the match through the router; on a non-matching path the
    /// handler receives an empty parameter set.
    pub fn dispatch(&self, path: &str, request: Arc<Request>) -> BoxFuture<'static, Response> {
        let params = self.match_path(path).unwrap_or_default();
        self.handler.call(HandlerParams { request, params })
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}
