//! HTTP server for Portico.
//!
//! Owns the listener, the middleware and interceptor lists, and the
//! static asset configuration, and drives each request through the
//! pipeline described in [`Server`].
//!
//! # Example
//!
//! ```rust
//! use portico_core::{read_body, Response, ResponseExt};
//! use portico_router::{HandlerParams, Router};
//! use portico_server::{InterceptorContext, Server, ServerConfig};
//! use bytes::Bytes;
//! use http::StatusCode;
//!
//! # tokio_test::block_on(async {
//! let router = Router::builder()
//!     .get("/:id", |p: HandlerParams| async move {
//!         let id = p.params.get("id").unwrap_or_default().to_string();
//!         Response::text(StatusCode::OK, id)
//!     })
//!     .build()
//!     .unwrap();
//!
//! let server = Server::new(router, ServerConfig::default());
//! server.intercept(|ctx: InterceptorContext| async move {
//!     let mut response = ctx.response;
//!     response.headers_mut().insert("x-powered-by", "portico".parse().unwrap());
//!     response
//! });
//!
//! let request = http::Request::builder().uri("/42").body(Bytes::new()).unwrap();
//! let response = server.handle(request).await;
//!
//! assert_eq!(response.headers()["x-powered-by"], "portico");
//! let (_, body) = read_body(response).await;
//! assert_eq!(body, "42");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/portico-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod pipeline;
mod server;
pub mod shutdown;
pub mod static_files;

pub use config::{
    AllowedExtensions, PublicDir, ServerConfig, ServerConfigBuilder, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use error::{ConfigError, ServerError};
pub use loader::ConfigLoader;
pub use pipeline::{
    run_interceptors, run_middleware, BoxedInterceptor, BoxedMiddleware, Interceptor,
    InterceptorContext, Middleware, MiddlewareContext,
};
pub use server::Server;
