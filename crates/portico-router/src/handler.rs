//! Route handler abstraction.

use std::future::Future;
use std::sync::Arc;

use portico_core::{BoxFuture, Request, Response};

use crate::params::Params;

/// Input passed to a route handler.
#[derive(Debug, Clone)]
pub struct HandlerParams {
    /// The incoming request, shared with middleware and interceptors.
    pub request: Arc<Request>,

    /// Parameters captured from the request path.
    pub params: Params,
}

/// An application-defined request handler.
///
/// Implemented for every `Fn(HandlerParams) -> impl Future<Output = Response>`,
/// so plain async closures can be registered directly.
///
/// # Example
///
/// ```rust
/// use portico_core::{Response, ResponseExt};
/// use portico_router::{Handler, HandlerParams};
/// use http::StatusCode;
///
/// fn assert_handler<H: Handler>(_: H) {}
///
/// assert_handler(|p: HandlerParams| async move {
///     let id = p.params.get("id").unwrap_or("none").to_string();
///     Response::text(StatusCode::OK, id)
/// });
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Produces the response for one request.
    fn call(&self, input: HandlerParams) -> BoxFuture<'static, Response>;
}

impl<F, Fut> Handler for F
where
    F: Fn(HandlerParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, input: HandlerParams) -> BoxFuture<'static, Response> {
        Box::pin(self(input))
    }
}

/// A type-erased handler as stored on a [`Route`](crate::Route).
pub type BoxedHandler = Arc<dyn Handler>;
