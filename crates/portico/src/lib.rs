//! # Portico
//!
//! A minimal HTTP dispatch layer. Each request runs through:
//!
//! ```text
//! Request → Middleware (first Some wins) ─────────────────────┐
//!              ↓ none answered                                │
//!          static asset? ── yes → public directory            │
//!              ↓ no                                           │
//!          Router (first path match, then method)             │
//!              ↓                                              │
//!          Interceptors (each replaces the response)          │
//!              ↓                                              ↓
//!          Response ←─────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portico::prelude::*;
//! use http::StatusCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&LogConfig::development())?;
//!
//!     let router = Router::builder()
//!         .get("/health", |_: HandlerParams| async {
//!             Response::text(StatusCode::OK, "ok")
//!         })
//!         .build()?;
//!
//!     let config = ConfigLoader::new()
//!         .with_optional_file("portico.toml")?
//!         .with_env_prefix("PORTICO")
//!         .load()?;
//!
//!     Server::new(router, config).start().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/portico/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use portico_client as client;
pub use portico_core as core;
pub use portico_router as router;
pub use portico_server as server;
pub use portico_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use portico::prelude::*;
/// use bytes::Bytes;
/// use http::StatusCode;
///
/// # tokio_test::block_on(async {
/// let router = Router::builder()
///     .get("/", |_: HandlerParams| async { Response::text(StatusCode::OK, "home") })
///     .build()
///     .unwrap();
/// let server = Server::new(router, ServerConfig::default());
///
/// let request = http::Request::builder()
///     .method("DELETE")
///     .uri("/")
///     .body(Bytes::new())
///     .unwrap();
/// let response = server.handle(request).await;
/// assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
/// # });
/// ```
pub mod prelude {
    pub use portico_core::{read_body, BoxFuture, DispatchError, Request, Response, ResponseExt};

    pub use portico_router::{Handler, HandlerParams, Params, Route, RouteError, Router};

    pub use portico_server::{
        AllowedExtensions, ConfigLoader, Interceptor, InterceptorContext, Middleware,
        MiddlewareContext, PublicDir, Server, ServerConfig, ServerError,
    };

    pub use portico_telemetry::{init_logging, LogConfig, LogFormat};

    pub use portico_client::{Fetch, OutboundRequest, OutboundResponse, Provider};
}
