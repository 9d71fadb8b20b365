//! Ingester configuration

use alerting::AlertConfig;
use config::{Config, ConfigError, Environment, File};
use data_validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use storage::RetentionConfig;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn, error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Account configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Username of the bootstrap admin account
    pub admin_username: String,
    /// Bootstrap admin password; no account is created when unset
    pub admin_password: Option<String>,
    /// Minimum length for new passwords
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: "Admin".to_string(),
            admin_password: None,
            min_password_length: 8,
        }
    }
}

/// Reference market prices per kilogram, in local currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketPrices {
    pub raw_honey_price: u32,
    pub processed_honey_price: u32,
    pub beeswax_price: u32,
}

impl Default for MarketPrices {
    fn default() -> Self {
        Self {
            raw_honey_price: 5000,
            processed_honey_price: 7000,
            beeswax_price: 3000,
        }
    }
}

/// Full ingester configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub logging: LoggingConfig,
    pub validation: ValidationConfig,
    pub alerting: AlertConfig,
    pub storage: RetentionConfig,
    pub auth: AuthConfig,
    pub market: MarketPrices,
}

impl IngestConfig {
    /// Load configuration.
    ///
    /// Layers, lowest precedence first: built-in defaults, the config file
    /// (`path`, or `hive-ingest.*` in the working directory if present),
    /// then `HIVE_` environment variables with `__` between sections,
    /// e.g. `HIVE_ALERTING__COOLDOWN_SECONDS=60`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&IngestConfig::default())?);

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("hive-ingest").required(false)),
        };

        builder
            .add_source(
                Environment::with_prefix("HIVE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
