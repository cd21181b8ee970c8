use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::models::SupportedDex;

/// Subgraph endpoints and chart anchors for one DEX deployment.
///
/// Each deployment has two subgraphs:
/// - data: pairs, tokens, factories, day datas, transactions
/// - blocks: block number lookup by timestamp
#[derive(Debug, Deserialize, Clone)]
pub struct DexSettings {
    pub dex: SupportedDex,
    pub name: String,
    /// Chain the deployment lives on (e.g. "bsc")
    pub chain: String,
    pub data_url: Url,
    pub blocks_url: Url,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Pool addresses never listed in the top pools
    #[serde(default)]
    pub hidden_pools: Vec<String>,
    /// First day of the protocol-wide chart
    #[serde(default = "default_protocol_start_timestamp")]
    pub protocol_start_timestamp: i64,
    /// First day of pool and token charts
    #[serde(default = "default_chart_start_timestamp")]
    pub chart_start_timestamp: i64,
}

fn default_enabled() -> bool {
    true
}

fn default_protocol_start_timestamp() -> i64 {
    1_619_136_000
}

fn default_chart_start_timestamp() -> i64 {
    1_619_170_975
}

/// HTTP transport configuration shared by all subgraph clients.
#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Refresh intervals for the background jobs.
#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    /// Protocol overview, chart, transactions and native prices
    #[serde(default = "default_protocol_interval_secs")]
    pub protocol_interval_secs: u64,
    /// Top pools with their charts and transactions
    #[serde(default = "default_pools_interval_secs")]
    pub pools_interval_secs: u64,
    /// Top tokens with their charts, pools and transactions
    #[serde(default = "default_tokens_interval_secs")]
    pub tokens_interval_secs: u64,
    /// Sampling interval of token price candles
    #[serde(default = "default_price_chart_interval_secs")]
    pub price_chart_interval_secs: i64,
    #[serde(default = "default_price_chart_lookback_days")]
    pub price_chart_lookback_days: i64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            protocol_interval_secs: default_protocol_interval_secs(),
            pools_interval_secs: default_pools_interval_secs(),
            tokens_interval_secs: default_tokens_interval_secs(),
            price_chart_interval_secs: default_price_chart_interval_secs(),
            price_chart_lookback_days: default_price_chart_lookback_days(),
        }
    }
}

fn default_protocol_interval_secs() -> u64 {
    300
}

fn default_pools_interval_secs() -> u64 {
    600
}

fn default_tokens_interval_secs() -> u64 {
    600
}

fn default_price_chart_interval_secs() -> i64 {
    3600
}

fn default_price_chart_lookback_days() -> i64 {
    7
}

/// Periodic JSON dump of the whole store.
///
/// Disabled when the section is absent.
#[derive(Debug, Deserialize, Clone)]
pub struct ExportSettings {
    pub path: String,
    #[serde(default = "default_export_interval_secs")]
    pub interval_secs: u64,
}

fn default_export_interval_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup, overridden by `DEXSCOPE__*`
/// environment variables (e.g. `DEXSCOPE__HTTP__REQUEST_TIMEOUT_SECS=10`).
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub dexes: Vec<DexSettings>,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub export: Option<ExportSettings>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .add_source(Environment::with_prefix("DEXSCOPE").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }

    /// Deployments that should be refreshed.
    pub fn enabled_dexes(&self) -> impl Iterator<Item = &DexSettings> {
        self.dexes.iter().filter(|d| d.enabled)
    }
}
