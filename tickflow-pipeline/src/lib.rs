/// Tickflow Pipeline - Shared Library
///
/// Common wiring for the three pipeline binaries:
/// - collector: historical fetch cycle -> timestamped dataset CSV
/// - live: warm-started sliding window + live trade feed + inference
/// - train-prep: incremental training cycle over new dataset files
///
/// The library holds the environment-variable configuration and the logging
/// initialisation shared by every binary. No CLI argument parsing: the
/// pipeline is configured entirely through `TICKFLOW_*` variables with
/// sensible defaults.
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tickflow_data::{
    exchange::binance::BinanceConfig, fetch::FetchConfig, live::FeedConfig, retry::RetryPolicy,
};

/// Environment-derived configuration shared by the pipeline binaries.
///
/// Every field has a default; an unset or unparseable variable falls back
/// silently, matching how the rest of this codebase treats tuning knobs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Trading-pair symbol (`TICKFLOW_SYMBOL`, default "BTCUSDT").
    pub symbol: String,
    /// Kline interval (`TICKFLOW_INTERVAL`, default "1m").
    pub interval: String,
    /// Dataset directory (`TICKFLOW_DATA_DIR`, default "data").
    pub data_dir: PathBuf,
    /// Historical lookback in minutes (`TICKFLOW_LOOKBACK_MIN`, default 2000).
    pub lookback_minutes: i64,
    /// Kline page span in minutes (`TICKFLOW_PAGE_SPAN_MIN`, default 1000).
    pub page_span_minutes: u32,
    /// Sliding window capacity (`TICKFLOW_WINDOW`, default 50).
    pub window_capacity: usize,
    /// Retry attempts per remote call (`TICKFLOW_RETRY_ATTEMPTS`, default 5).
    pub retry_attempts: u32,
    /// Fixed retry delay in seconds (`TICKFLOW_RETRY_DELAY_SECS`, default 10).
    pub retry_delay_secs: u64,
    /// WebSocket base URL override (`TICKFLOW_WS_URL`).
    pub ws_url: Option<String>,
    /// API key forwarded verbatim as a header (`TICKFLOW_API_KEY`).
    pub api_key: Option<String>,
    /// Abort at startup when no API key is configured
    /// (`TICKFLOW_REQUIRE_API_KEY`, default false).
    pub require_api_key: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: "1m".to_string(),
            data_dir: PathBuf::from("data"),
            lookback_minutes: 2000,
            page_span_minutes: 1000,
            window_capacity: 50,
            retry_attempts: 5,
            retry_delay_secs: 10,
            ws_url: None,
            api_key: None,
            require_api_key: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            symbol: env_string("TICKFLOW_SYMBOL", defaults.symbol),
            interval: env_string("TICKFLOW_INTERVAL", defaults.interval),
            data_dir: PathBuf::from(env_string(
                "TICKFLOW_DATA_DIR",
                defaults.data_dir.display().to_string(),
            )),
            lookback_minutes: env_parse("TICKFLOW_LOOKBACK_MIN", defaults.lookback_minutes),
            page_span_minutes: env_parse("TICKFLOW_PAGE_SPAN_MIN", defaults.page_span_minutes),
            window_capacity: env_parse("TICKFLOW_WINDOW", defaults.window_capacity),
            retry_attempts: env_parse("TICKFLOW_RETRY_ATTEMPTS", defaults.retry_attempts),
            retry_delay_secs: env_parse("TICKFLOW_RETRY_DELAY_SECS", defaults.retry_delay_secs),
            ws_url: std::env::var("TICKFLOW_WS_URL").ok(),
            api_key: std::env::var("TICKFLOW_API_KEY").ok(),
            require_api_key: env_parse("TICKFLOW_REQUIRE_API_KEY", defaults.require_api_key),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_secs(self.retry_delay_secs))
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::default()
            .with_page_span_minutes(self.page_span_minutes)
            .with_retry(self.retry_policy())
    }

    pub fn binance_config(&self) -> BinanceConfig {
        let mut config = BinanceConfig::default()
            .with_interval(self.interval.clone())
            .with_api_key_required(self.require_api_key);
        if let Some(api_key) = &self.api_key {
            config = config.with_api_key(api_key.clone());
        }
        config
    }

    pub fn feed_config(&self) -> FeedConfig {
        match &self.ws_url {
            Some(url) => FeedConfig::default().with_ws_base_url(url.clone()),
            None => FeedConfig::default(),
        }
    }

    /// Dataset file name for one collector run, eg/
    /// `BTCUSDT_20240701T120000Z.csv`. One file per run keeps the data
    /// directory append-only across runs.
    pub fn dataset_file_name(&self, now: DateTime<Utc>) -> String {
        format!("{}_{}.csv", self.symbol, now.format("%Y%m%dT%H%M%SZ"))
    }

    /// Trained-files log path inside the data directory.
    pub fn trained_files_log_path(&self) -> PathBuf {
        self.data_dir.join("trained_files.log")
    }
}

fn env_string(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Initialize logging: fmt subscriber with `RUST_LOG` override, "info"
/// default.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
