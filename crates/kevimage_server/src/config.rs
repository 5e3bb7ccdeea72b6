//! Service configuration.
//!
//! Sources in order of precedence (later sources override earlier):
//! 1. Bundled defaults (`kevimage.toml` shipped with the crate)
//! 2. User config in the home directory (`~/.config/kevimage/kevimage.toml`)
//! 3. `./kevimage.toml`, or an explicit path given on the command line
//! 4. Environment variables such as `KEVIMAGE__SERVER__PORT=8080`

use config::{Config, Environment, File, FileFormat};
use kevimage_error::{ConfigError, KevimageError, KevimageResult};
use kevimage_pipeline::HttpFetcherConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../kevimage.toml");

/// Listening address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

/// Content store location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding `<sha256>.<ext>` objects; created if missing
    pub cache_dir: PathBuf,
}

/// Metadata index database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub url: String,
    /// Maximum pooled connections
    pub pool_size: u32,
    /// How long a connection waits on a locked database
    pub busy_timeout_ms: u64,
}

/// Remote fetch limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Largest accepted source image in bytes
    pub max_bytes: u64,
    /// `User-Agent` header; defaults to `kevimage/<version>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Transcoding settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompressionConfig {
    /// JPEG quality target, 1 to 100
    pub quality: u8,
}

/// Log output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

/// Complete service configuration.
///
/// # Example
///
/// ```toml
/// [server]
/// host = "127.0.0.1"
/// port = 8080
///
/// [compression]
/// quality = 70
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KevimageConfig {
    /// Listening address
    pub server: ServerConfig,
    /// Content store
    pub storage: StorageConfig,
    /// Metadata index
    pub database: DatabaseConfig,
    /// Remote fetch
    pub fetch: FetchConfig,
    /// Transcoding
    pub compression: CompressionConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl Default for KevimageConfig {
    fn default() -> Self {
        Self::bundled()
    }
}

fn config_error(context: &str, e: config::ConfigError) -> KevimageError {
    KevimageError::from(ConfigError::new(format!("{}: {}", context, e)))
}

impl KevimageConfig {
    /// The bundled defaults alone.
    ///
    /// The bundled file is part of the binary, so a parse failure here is a
    /// packaging bug; it falls back to the compiled-in values.
    pub fn bundled() -> Self {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)
            .unwrap_or_else(|_| Self::compiled_defaults())
    }

    fn compiled_defaults() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
            },
            storage: StorageConfig {
                cache_dir: PathBuf::from("cache"),
            },
            database: DatabaseConfig {
                url: "kevimage.db".to_string(),
                pool_size: 8,
                busy_timeout_ms: 5000,
            },
            fetch: FetchConfig {
                timeout_secs: 30,
                max_bytes: 25 * 1024 * 1024,
                user_agent: None,
            },
            compression: CompressionConfig { quality: 80 },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
        }
    }

    /// Load configuration from every source.
    ///
    /// `explicit` replaces `./kevimage.toml` and, unlike it, must exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use kevimage_server::KevimageConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = KevimageConfig::load(None)?;
    /// println!("listening on {}", config.bind_addr());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> KevimageResult<Self> {
        Self::load_from(explicit, dirs::home_dir().as_deref(), None)
    }

    /// Load configuration with an explicit home directory and environment.
    ///
    /// `env` replaces the process environment when given.
    #[instrument(skip(env))]
    pub fn load_from(
        explicit: Option<&Path>,
        home: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> KevimageResult<Self> {
        debug!("Loading configuration: bundled < home < local < environment");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = home {
            let home_config = home.join(".config/kevimage/kevimage.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = match explicit {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("kevimage").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("KEVIMAGE")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = builder
            .build()
            .map_err(|e| config_error("Failed to build configuration", e))?
            .try_deserialize()
            .map_err(|e| config_error("Failed to parse configuration", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the type system does not.
    pub fn validate(&self) -> KevimageResult<()> {
        if !(1..=100).contains(&self.compression.quality) {
            return Err(ConfigError::new(format!(
                "compression.quality must be between 1 and 100, got {}",
                self.compression.quality
            ))
            .into());
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::new("database.pool_size must be at least 1").into());
        }
        if self.fetch.max_bytes == 0 {
            return Err(ConfigError::new("fetch.max_bytes must be at least 1").into());
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::new("server.host must not be empty").into());
        }
        Ok(())
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Settings for the HTTP fetcher.
    pub fn fetcher_config(&self) -> KevimageResult<HttpFetcherConfig> {
        let mut builder = HttpFetcherConfig::builder();
        builder
            .timeout(Duration::from_secs(self.fetch.timeout_secs))
            .max_bytes(self.fetch.max_bytes);
        if let Some(agent) = &self.fetch.user_agent {
            builder.user_agent(agent.clone());
        }
        Ok(builder.build()?)
    }

    /// Busy timeout for pooled database connections.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.database.busy_timeout_ms)
    }
}
