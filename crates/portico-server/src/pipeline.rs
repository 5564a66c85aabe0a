//! Middleware and interceptor stages.
//!
//! Middleware runs before dispatch and may short-circuit by returning a
//! response. Interceptors run after dispatch and each one replaces the
//! response seen by the next. A short-circuited response skips the
//! interceptors entirely.
//!
//! Both stages are plain async closures in the common case:
//!
//! ```rust
//! use portico_core::{Response, ResponseExt};
//! use portico_server::{InterceptorContext, Interceptor, Middleware, MiddlewareContext};
//! use http::StatusCode;
//!
//! fn assert_middleware<M: Middleware>(_: M) {}
//! fn assert_interceptor<I: Interceptor>(_: I) {}
//!
//! assert_middleware(|ctx: MiddlewareContext| async move {
//!     if ctx.request.headers().contains_key("authorization") {
//!         None
//!     } else {
//!         Some(Response::text(StatusCode::UNAUTHORIZED, "unauthorized"))
//!     }
//! });
//!
//! assert_interceptor(|ctx: InterceptorContext| async move {
//!     let mut response = ctx.response;
//!     response.headers_mut().insert("x-served-by", "portico".parse().unwrap());
//!     response
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use portico_core::{BoxFuture, Request, Response};
use portico_router::Router;

/// What a middleware sees.
#[derive(Debug, Clone)]
pub struct MiddlewareContext {
    /// The incoming request.
    pub request: Arc<Request>,

    /// The server's route table, for introspection.
    pub router: Arc<Router>,
}

/// What an interceptor sees.
#[derive(Debug)]
pub struct InterceptorContext {
    /// The incoming request.
    pub request: Arc<Request>,

    /// The server's route table, for introspection.
    pub router: Arc<Router>,

    /// The response produced so far.
    pub response: Response,
}

/// A pre-dispatch filter.
///
/// Returning `Some(response)` ends the pipeline with that response;
/// `None` passes the request to the next stage.
pub trait Middleware: Send + Sync + 'static {
    /// Inspects the request.
    fn call(&self, ctx: MiddlewareContext) -> BoxFuture<'static, Option<Response>>;
}

impl<F, Fut> Middleware for F
where
    F: Fn(MiddlewareContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<Response>> + Send + 'static,
{
    fn call(&self, ctx: MiddlewareContext) -> BoxFuture<'static, Option<Response>> {
        Box::pin(self(ctx))
    }
}

/// A post-dispatch response transformer.
///
/// Must always return a response; returning `ctx.response` unchanged is
/// a valid pass-through.
pub trait Interceptor: Send + Sync + 'static {
    /// Transforms the response.
    fn call(&self, ctx: InterceptorContext) -> BoxFuture<'static, Response>;
}

impl<F, Fut> Interceptor for F
where
    F: Fn(InterceptorContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, ctx: InterceptorContext) -> BoxFuture<'static, Response> {
        Box::pin(self(ctx))
    }
}

impl Interceptor for Arc<dyn Interceptor> {
    fn call(&self, ctx: InterceptorContext) -> BoxFuture<'static, Response> {
        (**self).call(ctx)
    }
}

/// A type-erased middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A type-erased interceptor.
pub type BoxedInterceptor = Arc<dyn Interceptor>;

/// Runs middleware in order until one produces a response.
pub async fn run_middleware(
    middleware: &[BoxedMiddleware],
    request: &Arc<Request>,
    router: &Arc<Router>,
) -> Option<Response> {
    for stage in middleware {
        let ctx = MiddlewareContext {
            request: Arc::clone(request),
            router: Arc::clone(router),
        };
        if let Some(response) = stage.call(ctx).await {
            return Some(response);
        }
    }
    None
}

/// Threads a response through every interceptor in order.
pub async fn run_interceptors(
    interceptors: &[BoxedInterceptor],
    request: &Arc<Request>,
    router: &Arc<Router>,
    response: Response,
) -> Response {
    let mut response = response;
    for stage in interceptors {
        let ctx = InterceptorContext {
            request: Arc::clone(request),
            router: Arc::clone(router),
            response,
        };
        response = stage.call(ctx).await;
    }
    response
}
