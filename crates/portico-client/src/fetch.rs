//! The outbound call capability.

use std::future::Future;
use std::time::Duration;

use portico_core::BoxFuture;
use reqwest::Client;

use crate::error::{ClientError, ClientResult};
use crate::message::{OutboundRequest, OutboundResponse};

/// Performs one HTTP exchange.
///
/// [`ReqwestFetch`] is the default; any async closure with the right
/// signature also qualifies, which is how tests stub the network.
pub trait Fetch: Send + Sync + 'static {
    /// Sends `request` and buffers the response.
    fn fetch(&self, request: OutboundRequest) -> BoxFuture<'static, ClientResult<OutboundResponse>>;
}

impl<F, Fut> Fetch for F
where
    F: Fn(OutboundRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ClientResult<OutboundResponse>> + Send + 'static,
{
    fn fetch(&self, request: OutboundRequest) -> BoxFuture<'static, ClientResult<OutboundResponse>> {
        Box::pin(self(request))
    }
}

/// [`Fetch`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetch {
    client: Client,
}

impl ReqwestFetch {
    /// Creates a fetcher with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the client cannot be built.
    pub fn with_timeout(timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::transport(format!("failed to create client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for ReqwestFetch {
    fn fetch(&self, request: OutboundRequest) -> BoxFuture<'static, ClientResult<OutboundResponse>> {
        let client = self.client.clone();

        Box::pin(async move {
            let mut builder = client
                .request(request.method, &request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| ClientError::transport(format!("request failed: {e}")))?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| ClientError::Body(e.to_string()))?;

            Ok(OutboundResponse {
                status,
                headers,
                body,
            })
        })
    }
}
