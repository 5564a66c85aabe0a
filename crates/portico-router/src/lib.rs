//! Path pattern routing for Portico.
//!
//! Routes are matched with a linear, first-match scan in registration
//! order. Patterns are `/`-separated; a segment starting with `:` captures
//! the corresponding segment of the request path.
//!
//! # Example
//!
//! ```rust
//! use portico_core::{Response, ResponseExt};
//! use portico_router::{HandlerParams, RouteError, Router};
//! use http::{Method, StatusCode};
//!
//! let router = Router::builder()
//!     .get("/", |_: HandlerParams| async { Response::text(StatusCode::OK, "home") })
//!     .post("/users/:id", |p: HandlerParams| async move {
//!         Response::text(StatusCode::OK, p.params.get("id").unwrap_or_default().to_string())
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert!(router.resolve("/", &Method::GET).is_ok());
//! assert!(matches!(
//!     router.resolve("/", &Method::POST),
//!     Err(RouteError::MethodNotAllowed { allowed }) if allowed == Method::GET
//! ));
//! assert_eq!(router.list_paths(), vec!["/", "/users/:id"]);
//! ```
//!
//! # First-match semantics
//!
//! Only the first route whose pattern matches the path is considered. If
//! its method differs from the request, resolution fails with
//! [`RouteError::MethodNotAllowed`] even when a later route would accept
//! both path and method.

#![doc(html_root_url = "https://docs.rs/portico-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod handler;
mod params;
mod pattern;
mod route;
mod router;

pub use handler::{BoxedHandler, Handler, HandlerParams};
pub use params::Params;
pub use pattern::{PathPattern, PatternError, Segment};
pub use route::Route;
pub use router::{RouteError, Router, RouterBuilder};
