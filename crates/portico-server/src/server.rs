//! The HTTP server and its request pipeline.
//!
//! Every request goes through the same linear sequence:
//!
//! 1. Middleware, in registration order. The first one to return a
//!    response ends the request; nothing below runs.
//! 2. Dispatch. Paths whose last segment has an extension are served from
//!    the public directory, everything else is resolved by the router.
//! 3. Interceptors, in registration order, each replacing the response.
//!
//! # Example
//!
//! ```rust,no_run
//! use portico_core::{Response, ResponseExt};
//! use portico_router::{HandlerParams, Router};
//! use portico_server::{Server, ServerConfig};
//! use http::StatusCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::builder()
//!         .get("/", |_: HandlerParams| async { Response::text(StatusCode::OK, "hello") })
//!         .build()?;
//!
//!     let server = Server::new(router, ServerConfig::builder().port(8080).build());
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use parking_lot::{Mutex, RwLock};
use portico_core::{DispatchError, Request, Response, ResponseExt};
use portico_router::Router;
use tokio::net::{TcpListener, TcpStream};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::pipeline::{
    run_interceptors, run_middleware, BoxedInterceptor, BoxedMiddleware, Interceptor, Middleware,
};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};
use crate::static_files;

/// The Portico HTTP server.
///
/// Cheap to clone; clones share the same router, stage lists, and
/// lifecycle, so one clone can [`stop`](Self::stop) a server another clone
/// is running.
#[derive(Clone)]
pub struct Server {
    inner: Arc<Inner>,
}

struct Inner {
    router: Arc<Router>,
    config: ServerConfig,
    middleware: RwLock<Vec<BoxedMiddleware>>,
    interceptors: RwLock<Vec<BoxedInterceptor>>,
    shutdown: ShutdownSignal,
    started: AtomicBool,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl Server {
    /// Creates a server. Nothing is bound until [`start`](Self::start).
    #[must_use]
    pub fn new(router: Router, config: ServerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                router: Arc::new(router),
                config,
                middleware: RwLock::new(Vec::new()),
                interceptors: RwLock::new(Vec::new()),
                shutdown: ShutdownSignal::new(),
                started: AtomicBool::new(false),
                local_addr: Mutex::new(None),
            }),
        }
    }

    /// Returns the route table.
    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.inner.router
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Appends a middleware.
    ///
    /// Requests already in the pipeline keep the list they started with.
    pub fn use_middleware(&self, middleware: impl Middleware) {
        self.inner.middleware.write().push(Arc::new(middleware));
    }

    /// Appends several middleware, keeping their order.
    pub fn use_all(&self, middleware: impl IntoIterator<Item = BoxedMiddleware>) {
        self.inner.middleware.write().extend(middleware);
    }

    /// Appends an interceptor.
    ///
    /// Requests already in the pipeline keep the list they started with.
    pub fn intercept(&self, interceptor: impl Interceptor) {
        self.inner.interceptors.write().push(Arc::new(interceptor));
    }

    /// Appends several interceptors, keeping their order.
    pub fn intercept_all(&self, interceptors: impl IntoIterator<Item = BoxedInterceptor>) {
        self.inner.interceptors.write().extend(interceptors);
    }

    /// Returns the bound address while the server is listening.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.inner.local_addr.lock()
    }

    /// Returns `true` once [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.shutdown.is_shutdown()
    }

    /// Binds the configured address and serves until [`stop`](Self::stop).
    ///
    /// After `stop`, open connections are asked to finish and the call
    /// waits up to the configured shutdown timeout for them before
    /// returning.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound,
    /// [`ServerError::AlreadyStarted`] if the server is already running,
    /// or [`ServerError::Stopped`] if it was stopped.
    pub async fn start(&self) -> Result<(), ServerError> {
        if self.is_stopped() {
            return Err(ServerError::Stopped);
        }
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(ServerError::AlreadyStarted);
        }

        // Any failure before the accept loop leaves the server startable.
        let (listener, addr) = match self.listen().await {
            Ok(bound) => bound,
            Err(error) => {
                self.inner.started.store(false, Ordering::SeqCst);
                return Err(error);
            }
        };

        *self.inner.local_addr.lock() = Some(addr);
        tracing::info!(%addr, "Server listening");

        self.accept_loop(listener).await;

        *self.inner.local_addr.lock() = None;
        tracing::info!("Server stopped");
        Ok(())
    }

    /// Stops accepting connections and asks open ones to close.
    ///
    /// Idempotent. The server cannot be started again afterwards.
    pub fn stop(&self) {
        if self.inner.shutdown.trigger() {
            tracing::info!("Stop requested");
        }
    }

    /// Runs one request through the pipeline without a socket.
    pub async fn handle(&self, request: Request) -> Response {
        let request = Arc::new(request);
        let router = Arc::clone(&self.inner.router);

        // Snapshot both lists; appends made from now on affect later
        // requests only.
        let middleware = self.inner.middleware.read().clone();
        let interceptors = self.inner.interceptors.read().clone();

        if let Some(response) = run_middleware(&middleware, &request, &router).await {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                status = response.status().as_u16(),
                "Request short-circuited by middleware"
            );
            return response;
        }

        let response = self.dispatch(&request).await;
        let response = run_interceptors(&interceptors, &request, &router, response).await;

        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            status = response.status().as_u16(),
            "Request completed"
        );
        response
    }

    async fn dispatch(&self, request: &Arc<Request>) -> Response {
        let path = request.uri().path();

        if static_files::is_static_request(path) {
            return match static_files::serve(self.inner.config.public_dir(), path).await {
                Ok(response) => response,
                Err(error) => {
                    tracing::debug!(%path, %error, "Static asset not served");
                    error.into_response()
                }
            };
        }

        match self.inner.router.resolve(path, request.method()) {
            Ok(route) => route.dispatch(path, Arc::clone(request)).await,
            Err(error) => {
                tracing::debug!(%path, method = %request.method(), %error, "Route not resolved");
                DispatchError::from(error).into_response()
            }
        }
    }

    async fn listen(&self) -> Result<(TcpListener, SocketAddr), ServerError> {
        let config = &self.inner.config;
        let listener = TcpListener::bind((config.host(), config.port()))
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.to_string(),
                source,
            })?;
        let addr = listener.local_addr()?;
        Ok((listener, addr))
    }

    async fn accept_loop(&self, listener: TcpListener) {
        let shutdown = self.inner.shutdown.clone();
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = self.clone();
                            let guard = tracker.track();

                            tokio::spawn(async move {
                                if let Err(e) = server.serve_connection(stream).await {
                                    tracing::error!(%remote_addr, error = %e, "Connection error");
                                }
                                drop(guard);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to accept connection");
                        }
                    }
                }

                () = shutdown.recv() => break,
            }
        }

        drop(listener);

        let timeout = self.inner.config.shutdown_timeout();
        tracing::info!(
            ?timeout,
            active = tracker.active(),
            "Waiting for connections to close"
        );

        if tokio::time::timeout(timeout, tracker.wait_idle()).await.is_err() {
            tracing::warn!(
                active = tracker.active(),
                "Shutdown timeout reached with connections still open"
            );
        }
    }

    async fn serve_connection(&self, stream: TcpStream) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = self.clone();

        let service = service_fn(move |req: hyper::Request<Incoming>| {
            let server = server.clone();
            async move { Ok::<_, Infallible>(server.handle_incoming(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = self.inner.shutdown.recv() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_incoming(&self, req: hyper::Request<Incoming>) -> Response {
        let (parts, body) = req.into_parts();

        let body: Bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read request body");
                return Response::text(StatusCode::BAD_REQUEST, "Error: failed to read request body");
            }
        };

        self.handle(Request::from_parts(parts, body)).await
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.inner.config)
            .field("routes", &self.inner.router.list_paths())
            .field("middleware", &self.inner.middleware.read().len())
            .field("interceptors", &self.inner.interceptors.read().len())
            .field("local_addr", &self.local_addr())
            .finish()
    }
}
