use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::types::EndpointLimit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub venues: HashMap<String, VenueConfig>,
    #[serde(default)]
    pub withdrawal: WithdrawalConfig,
    #[serde(default)]
    pub spot: SpotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Replaces entries of the venue's built-in endpoint table with the same method and path.
    #[serde(default)]
    pub endpoint_limits: Vec<EndpointLimit>,
    /// Fraction shaved off a sized withdrawal before rounding. Zero disables it.
    #[serde(default)]
    pub extra_withdrawal_buffer: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalConfig {
    /// USD value removed from the amount after each balance-locked attempt.
    pub retry_step_usd: Decimal,
    pub usd_ticker: String,
    /// Stable-reference value used when a venue's minimum withdrawal truncates
    /// to zero at its own precision. Zero keeps the raw minimum.
    #[serde(default)]
    pub min_withdrawal_stable: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotConfig {
    pub stable_reference: String,
    /// Safety margin applied to stable-reference minimums before conversion.
    pub cross_rate_margin: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub enable_json: bool,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_locale() -> String {
    "en-US".to_string()
}

impl BridgeConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("VENUEBRIDGE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for path in paths {
            builder = builder.add_source(File::from(path.as_ref()).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix("VENUEBRIDGE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn development() -> Self {
        Self {
            venues: Self::default_venues(),
            withdrawal: WithdrawalConfig::default(),
            spot: SpotConfig::default(),
            logging: LoggingConfig::development(),
        }
    }

    pub fn production() -> Self {
        Self {
            venues: Self::default_venues(),
            withdrawal: WithdrawalConfig::default(),
            spot: SpotConfig::default(),
            logging: LoggingConfig::production(),
        }
    }

    pub fn venue(&self, slug: &str) -> Option<&VenueConfig> {
        self.venues.get(&slug.to_lowercase())
    }

    fn default_venues() -> HashMap<String, VenueConfig> {
        let mut venues = HashMap::new();
        venues.insert("bitget".to_string(), VenueConfig::new("https://api.bitget.com"));
        venues.insert("kucoin".to_string(), VenueConfig::new("https://api.kucoin.com"));
        venues
    }
}

impl VenueConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout_ms: default_request_timeout_ms(),
            locale: default_locale(),
            endpoint_limits: Vec::new(),
            extra_withdrawal_buffer: Decimal::ZERO,
        }
    }
}

impl Default for WithdrawalConfig {
    fn default() -> Self {
        Self {
            retry_step_usd: Decimal::from(10),
            usd_ticker: "USD".to_string(),
            min_withdrawal_stable: Decimal::ZERO,
        }
    }
}

impl Default for SpotConfig {
    fn default() -> Self {
        Self {
            stable_reference: "USDT".to_string(),
            cross_rate_margin: Decimal::new(10, 2),
        }
    }
}

impl LoggingConfig {
    fn development() -> Self {
        Self {
            level: "debug".to_string(),
            file: None,
            enable_json: false,
        }
    }

    fn production() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("logs/venuebridge.log".to_string()),
            enable_json: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::production()
    }
}
