//! Logging setup for Portico services.
//!
//! The server crates only emit `tracing` events; this crate installs the
//! subscriber that formats and filters them. Call [`init_logging`] once at
//! startup.

#![doc(html_root_url = "https://docs.rs/portico-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};
