//! Layered configuration loading.
//!
//! Later layers override earlier ones, field by field:
//! 1. Built-in defaults
//! 2. A TOML file or string
//! 3. Environment variables under a prefix

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::config::{AllowedExtensions, PublicDir, ServerConfig};
use crate::error::ConfigError;

/// The TOML file layout. Every field is optional so a file only needs to
/// name what it changes.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    shutdown_timeout_secs: Option<u64>,
    public_dir: Option<PublicDir>,
}

/// Loads a [`ServerConfig`] from defaults, files, and the environment.
///
/// Recognized environment variables, for prefix `PORTICO`:
///
/// | Variable | Effect |
/// |---|---|
/// | `PORTICO_HOST` | bind host |
/// | `PORTICO_PORT` | bind port |
/// | `PORTICO_PUBLIC_DIR` | public directory path (allow list kept, or `*`) |
/// | `PORTICO_SHUTDOWN_TIMEOUT_SECS` | shutdown timeout in seconds |
///
/// # Example
///
/// ```
/// use portico_server::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_string(r#"
///         port = 8080
///
///         [public_dir]
///         path = "./public"
///         allowed_extensions = ["css", "js"]
///     "#)
///     .unwrap()
///     .load()
///     .unwrap();
///
/// assert_eq!(config.port(), 8080);
/// assert_eq!(config.host(), "0.0.0.0");
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: ServerConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Creates a loader seeded with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the base layer with an existing configuration.
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Merges a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, or not valid TOML for the
    /// server schema.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.with_string(&content)
    }

    /// Merges a TOML configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Merges TOML configuration from a string.
    ///
    /// # Errors
    ///
    /// Fails if the content is not valid TOML for the server schema.
    pub fn with_string(mut self, content: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(content)?;
        self.merge(file);
        Ok(self)
    }

    /// Enables environment overrides under `prefix` (upper-cased).
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and returns the configuration.
    ///
    /// # Errors
    ///
    /// Fails if a recognized variable holds an unparsable value.
    pub fn load(mut self) -> Result<ServerConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_vars(&prefix, env::vars())?;
        }
        Ok(self.config)
    }

    fn merge(&mut self, file: FileConfig) {
        let mut builder = self.config.to_builder();
        if let Some(host) = file.host {
            builder = builder.host(host);
        }
        if let Some(port) = file.port {
            builder = builder.port(port);
        }
        if let Some(secs) = file.shutdown_timeout_secs {
            builder = builder.shutdown_timeout(Duration::from_secs(secs));
        }
        if let Some(public_dir) = file.public_dir {
            builder = builder.public_dir(public_dir);
        }
        self.config = builder.build();
    }

    fn apply_env_vars(
        &mut self,
        prefix: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<(), ConfigError> {
        for (key, value) in vars {
            let Some(name) = key
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('_'))
            else {
                continue;
            };

            let builder = self.config.to_builder();
            self.config = match name {
                "HOST" => builder.host(value),
                "PORT" => builder.port(
                    value
                        .parse()
                        .map_err(|_| ConfigError::invalid_env(&key, "expected a port number"))?,
                ),
                "SHUTDOWN_TIMEOUT_SECS" => builder.shutdown_timeout(Duration::from_secs(
                    value
                        .parse()
                        .map_err(|_| ConfigError::invalid_env(&key, "expected integer"))?,
                )),
                "PUBLIC_DIR" => {
                    let allowed = self
                        .config
                        .public_dir()
                        .map_or(AllowedExtensions::Any, |dir| {
                            dir.allowed_extensions().clone()
                        });
                    builder.public_dir(PublicDir::new(value, allowed))
                }
                _ => continue,
            }
            .build();
        }

        Ok(())
    }
}
