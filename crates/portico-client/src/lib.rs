//! Outbound HTTP calls for Portico handlers.
//!
//! A [`Provider`] binds a base URL, resolves relative paths against it and
//! runs request interceptors before handing the request to a [`Fetch`]
//! implementation. [`ReqwestFetch`] is the production transport; tests swap
//! in an async closure.

#![doc(html_root_url = "https://docs.rs/portico-client/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod fetch;
mod message;
mod provider;

pub use error::{ClientError, ClientResult};
pub use fetch::{Fetch, ReqwestFetch};
pub use message::{OutboundRequest, OutboundResponse};
pub use provider::Provider;
