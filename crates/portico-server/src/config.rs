//! Server configuration types.
//!
//! # Example
//!
//! ```rust
//! use portico_server::{AllowedExtensions, PublicDir, ServerConfig};
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .host("127.0.0.1")
//!     .port(3000)
//!     .public_dir(PublicDir::new("./public", AllowedExtensions::only(["css", "js"])))
//!     .shutdown_timeout(Duration::from_secs(5))
//!     .build();
//!
//! assert_eq!(config.port(), 3000);
//! assert!(config.public_dir().is_some());
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Which file extensions the static resolver may serve.
///
/// Deserializes from the string `"*"` or from a list of extensions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawExtensions")]
pub enum AllowedExtensions {
    /// Every extension is allowed.
    #[default]
    Any,

    /// Only the listed extensions (without the leading dot).
    Only(BTreeSet<String>),
}

impl AllowedExtensions {
    /// Builds an allow list. A leading `.` on an entry is dropped.
    pub fn only<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Only(
            extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_string())
                .collect(),
        )
    }

    /// Returns `true` if `extension` may be served. Comparison is exact.
    #[must_use]
    pub fn allows(&self, extension: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(set) => set.contains(extension),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExtensions {
    Wildcard(String),
    List(Vec<String>),
}

impl TryFrom<RawExtensions> for AllowedExtensions {
    type Error = String;

    fn try_from(raw: RawExtensions) -> Result<Self, Self::Error> {
        match raw {
            RawExtensions::Wildcard(s) if s == "*" => Ok(Self::Any),
            RawExtensions::Wildcard(s) => Err(format!(
                "expected \"*\" or a list of extensions, found \"{s}\""
            )),
            RawExtensions::List(list) => Ok(Self::only(list)),
        }
    }
}

/// Static asset configuration: a root directory and an extension allow list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublicDir {
    path: PathBuf,
    #[serde(default)]
    allowed_extensions: AllowedExtensions,
}

impl PublicDir {
    /// Creates a public directory configuration.
    pub fn new(path: impl Into<PathBuf>, allowed_extensions: AllowedExtensions) -> Self {
        Self {
            path: path.into(),
            allowed_extensions,
        }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the extension allow list.
    #[must_use]
    pub fn allowed_extensions(&self) -> &AllowedExtensions {
        &self.allowed_extensions
    }
}

/// Server configuration.
///
/// Immutable once built. Use [`ServerConfig::builder()`] or
/// [`ConfigLoader`](crate::ConfigLoader) to construct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    host: String,
    port: u16,
    public_dir: Option<PublicDir>,
    shutdown_timeout: Duration,
}

impl ServerConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the bind host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the bind port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the static asset configuration, if any.
    #[must_use]
    pub fn public_dir(&self) -> Option<&PublicDir> {
        self.public_dir.as_ref()
    }

    /// Returns how long [`Server::stop`](crate::Server::stop) waits for open
    /// connections to drain.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Returns a builder seeded with this configuration.
    #[must_use]
    pub fn to_builder(&self) -> ServerConfigBuilder {
        ServerConfigBuilder {
            host: self.host.clone(),
            port: self.port,
            public_dir: self.public_dir.clone(),
            shutdown_timeout: self.shutdown_timeout,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    host: String,
    port: u16,
    public_dir: Option<PublicDir>,
    shutdown_timeout: Duration,
}

impl ServerConfigBuilder {
    /// Creates a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            public_dir: None,
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        }
    }

    /// Sets the bind host (an IP address or a resolvable name).
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the bind port. Port `0` asks the OS for a free port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables static asset resolution.
    #[must_use]
    pub fn public_dir(mut self, public_dir: PublicDir) -> Self {
        self.public_dir = Some(public_dir);
        self
    }

    /// Disables static asset resolution.
    #[must_use]
    pub fn no_public_dir(mut self) -> Self {
        self.public_dir = None;
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            public_dir: self.public_dir,
            shutdown_timeout: self.shutdown_timeout,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
