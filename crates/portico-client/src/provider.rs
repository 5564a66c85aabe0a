//! Base-URL-bound outbound client with request interceptors.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::fetch::{Fetch, ReqwestFetch};
use crate::message::{OutboundRequest, OutboundResponse};

type RequestInterceptor = Arc<dyn Fn(OutboundRequest) -> OutboundRequest + Send + Sync>;

/// Client bound to one upstream base URL.
///
/// Relative request URLs are joined onto the base. Absolute `http://` and
/// `https://` URLs pass through untouched. Interceptors registered with
/// [`Provider::intercept`] rewrite every request, in registration order,
/// after resolution and before the call leaves the process.
///
/// # Example
///
/// ```rust,no_run
/// use http::{HeaderName, HeaderValue};
/// use portico_client::Provider;
///
/// # async fn run() -> portico_client::ClientResult<()> {
/// let users = Provider::new("https://users.internal/api");
/// users.intercept(|req| {
///     req.with_header(
///         HeaderName::from_static("x-service"),
///         HeaderValue::from_static("portico"),
///     )
/// });
///
/// let response = users.get("/users/42").await?;
/// println!("{}", response.status);
/// # Ok(())
/// # }
/// ```
pub struct Provider {
    base: String,
    fetch: Arc<dyn Fetch>,
    interceptors: RwLock<Vec<RequestInterceptor>>,
}

impl Provider {
    /// Creates a provider that sends through a default [`ReqwestFetch`].
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_fetch(base, ReqwestFetch::new())
    }

    /// Creates a provider that sends through `fetch`.
    pub fn with_fetch(base: impl Into<String>, fetch: impl Fetch) -> Self {
        Self {
            base: base.into(),
            fetch: Arc::new(fetch),
            interceptors: RwLock::new(Vec::new()),
        }
    }

    /// The base URL relative requests are resolved against.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Appends a request interceptor.
    pub fn intercept<F>(&self, interceptor: F)
    where
        F: Fn(OutboundRequest) -> OutboundRequest + Send + Sync + 'static,
    {
        self.interceptors.write().push(Arc::new(interceptor));
    }

    /// Number of registered interceptors.
    pub fn interceptor_count(&self) -> usize {
        self.interceptors.read().len()
    }

    /// Resolves, intercepts and sends `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUri`] if the resolved URL does not parse,
    /// or whatever the underlying [`Fetch`] reports.
    pub async fn send(&self, mut request: OutboundRequest) -> ClientResult<OutboundResponse> {
        request.url = self.resolve(&request.url);
        request
            .url
            .parse::<http::Uri>()
            .map_err(|e| ClientError::invalid_uri(&request.url, e.to_string()))?;

        let interceptors = self.interceptors.read().clone();
        let request = interceptors
            .iter()
            .fold(request, |request, interceptor| interceptor(request));

        debug!(method = %request.method, url = %request.url, "Sending outbound request");

        let response = self.fetch.fetch(request).await?;

        debug!(status = response.status.as_u16(), "Outbound response received");

        Ok(response)
    }

    /// Sends a `GET` for `path`.
    ///
    /// # Errors
    ///
    /// See [`Provider::send`].
    pub async fn get(&self, path: &str) -> ClientResult<OutboundResponse> {
        self.send(OutboundRequest::get(path)).await
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("base", &self.base)
            .field("interceptors", &self.interceptor_count())
            .finish_non_exhaustive()
    }
}
