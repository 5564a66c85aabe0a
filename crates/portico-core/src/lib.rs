//! # Portico Core
//!
//! Types shared by every stage of the Portico request pipeline:
//!
//! - [`Request`] / [`Response`]: the HTTP types handlers, middleware, and
//!   interceptors exchange
//! - [`ResponseExt`]: small constructors for plain responses
//! - [`DispatchError`]: the failures the pipeline itself can produce, each
//!   of which converts into a terminal error response

#![doc(html_root_url = "https://docs.rs/portico-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod types;

pub use error::DispatchError;
pub use types::{read_body, BoxFuture, Request, Response, ResponseExt};
