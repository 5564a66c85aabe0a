//! Common types used throughout the request pipeline.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::{BodyExt, Full};

/// A boxed future, used wherever a pipeline stage is stored as a trait object.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The HTTP request type seen by handlers, middleware, and interceptors.
///
/// The server collects the body before the pipeline starts, so it is
/// available as plain [`Bytes`].
pub type Request = http::Request<Bytes>;

/// The HTTP response type produced by the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Constructors for simple responses.
pub trait ResponseExt {
    /// Creates a `text/plain` response with the given status.
    fn text(status: StatusCode, body: impl Into<String>) -> Response;

    /// Creates a response carrying raw bytes and an explicit content type.
    fn bytes(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response;
}

impl ResponseExt for Response {
    fn text(status: StatusCode, body: impl Into<String>) -> Response {
        Self::bytes(status, "text/plain; charset=utf-8", body.into())
    }

    fn bytes(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response {
        let mut response = http::Response::new(Full::new(body.into()));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        response
    }
}

/// Splits a response into its head and its fully buffered body.
///
/// Interceptors use this to inspect or rewrite a body produced upstream.
pub async fn read_body(response: Response) -> (http::response::Parts, Bytes) {
    let (parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };
    (parts, bytes)
}
