use crate::{
    de::de_str,
    error::DataError,
    exchange::MarketSource,
    record::{FundingRate, Kline, Liquidation, OrderBookSnapshot, TimeRange, TradeTick},
};
use async_trait::async_trait;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

/// Order book snapshot payloads.
pub mod book;
/// Funding rate history payloads.
pub mod funding;
/// Kline (candlestick) payloads.
pub mod kline;
/// Forced liquidation order payloads.
pub mod liquidation;
/// Aggregate trade and live trade-tick payloads.
pub mod trade;

use book::BinanceOrderBook;
use funding::BinanceFundingRate;
use kline::BinanceKline;
use liquidation::BinanceForceOrder;
use trade::BinanceAggTrade;

/// [`BinanceClient`] spot REST API base url.
///
/// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/rest-api>
pub const REST_BASE_URL_BINANCE_SPOT: &str = "https://api.binance.com";

/// [`BinanceClient`] USD-margined futures REST API base url.
///
/// Funding rates and forced liquidation orders only exist on the derivatives
/// API.
///
/// See docs: <https://developers.binance.com/docs/derivatives/usds-margined-futures/general-info>
pub const REST_BASE_URL_BINANCE_FUTURES: &str = "https://fapi.binance.com";

/// [`BinanceClient`] spot WebSocket base url for raw streams.
///
/// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/web-socket-streams>
pub const WS_BASE_URL_BINANCE_SPOT: &str = "wss://stream.binance.com:9443/ws";

/// Server-side row cap for one kline request.
pub const KLINE_PAGE_LIMIT: u32 = 1000;

/// Configuration for [`BinanceClient`].
///
/// `Default` targets production endpoints; tests point the urls at fixtures.
#[derive(Clone, Debug)]
pub struct BinanceConfig {
    pub spot_url: String,
    pub futures_url: String,
    /// Kline interval requested from the exchange (eg/ "1m", "5m").
    pub interval: String,
    /// Forwarded verbatim as the `X-MBX-APIKEY` header when present. None of
    /// the endpoints used here require signing.
    pub api_key: Option<String>,
    /// Fail construction when no `api_key` is configured. Off by default:
    /// the public market-data endpoints work unauthenticated, but deployments
    /// behind keyed rate limits want the missing credential surfaced at
    /// startup, not as mid-run rejections.
    pub api_key_required: bool,
    pub timeout: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            spot_url: REST_BASE_URL_BINANCE_SPOT.to_string(),
            futures_url: REST_BASE_URL_BINANCE_FUTURES.to_string(),
            interval: "1m".to_string(),
            api_key: None,
            api_key_required: false,
            timeout: Duration::from_secs(30),
        }
    }
}

impl BinanceConfig {
    pub fn with_spot_url(mut self, url: impl Into<String>) -> Self {
        self.spot_url = url.into();
        self
    }

    pub fn with_futures_url(mut self, url: impl Into<String>) -> Self {
        self.futures_url = url.into();
        self
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_key_required(mut self, api_key_required: bool) -> Self {
        self.api_key_required = api_key_required;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Thin REST client over the handful of Binance endpoints the pipeline needs.
///
/// Holds one pooled [`reqwest::Client`]; cloning is cheap and shares the pool.
#[derive(Clone, Debug)]
pub struct BinanceClient {
    http: reqwest::Client,
    config: BinanceConfig,
}

impl BinanceClient {
    pub fn new(config: BinanceConfig) -> Result<Self, DataError> {
        if config.api_key_required && config.api_key.is_none() {
            return Err(DataError::MissingCredentials("X-MBX-APIKEY"));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &BinanceConfig {
        &self.config
    }

    /// Most recent `limit` candles, used to warm-start the live window.
    pub async fn recent_klines(&self, symbol: &str, limit: u32) -> Result<Vec<Kline>, DataError> {
        let url = format!("{}/api/v3/klines", self.config.spot_url);
        let rows: Vec<BinanceKline> = self
            .get_json(
                &url,
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", self.config.interval.clone()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().map(Kline::from).collect())
    }

    /// Current spot price for `symbol`.
    ///
    /// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/rest-api#symbol-price-ticker>
    pub async fn ticker_price(&self, symbol: &str) -> Result<f64, DataError> {
        let url = format!("{}/api/v3/ticker/price", self.config.spot_url);
        let ticker: BinanceTickerPrice = self
            .get_json(&url, &[("symbol", symbol.to_string())])
            .await?;

        Ok(ticker.price)
    }

    async fn get_json<T>(&self, url: &str, query: &[(&str, String)]) -> Result<T, DataError>
    where
        T: DeserializeOwned,
    {
        let mut request = self.http.get(url).query(query);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("X-MBX-APIKEY", api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::from_status(
                status,
                format!("GET {url} returned {status}: {body}"),
            ));
        }

        response.json::<T>().await.map_err(DataError::from)
    }
}

#[async_trait]
impl MarketSource for BinanceClient {
    async fn klines(&self, symbol: &str, window: TimeRange) -> Result<Vec<Kline>, DataError> {
        let url = format!("{}/api/v3/klines", self.config.spot_url);
        // The server treats endTime as inclusive; subtracting 1ms keeps the
        // requested pages half-open so page boundaries are never fetched twice.
        let end_ms = window.end().timestamp_millis() - 1;
        let rows: Vec<BinanceKline> = self
            .get_json(
                &url,
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", self.config.interval.clone()),
                    ("startTime", window.start().timestamp_millis().to_string()),
                    ("endTime", end_ms.to_string()),
                    ("limit", KLINE_PAGE_LIMIT.to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().map(Kline::from).collect())
    }

    async fn order_book(&self, symbol: &str, depth: u32) -> Result<OrderBookSnapshot, DataError> {
        let url = format!("{}/api/v3/depth", self.config.spot_url);
        let book: BinanceOrderBook = self
            .get_json(
                &url,
                &[
                    ("symbol", symbol.to_string()),
                    ("limit", depth.to_string()),
                ],
            )
            .await?;

        Ok(OrderBookSnapshot::from(book))
    }

    async fn funding_rates(&self, symbol: &str, limit: u32) -> Result<Vec<FundingRate>, DataError> {
        let url = format!("{}/fapi/v1/fundingRate", self.config.futures_url);
        let rows: Vec<BinanceFundingRate> = self
            .get_json(
                &url,
                &[
                    ("symbol", symbol.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().map(FundingRate::from).collect())
    }

    async fn trades(&self, symbol: &str, limit: u32) -> Result<Vec<TradeTick>, DataError> {
        let url = format!("{}/api/v3/aggTrades", self.config.spot_url);
        let rows: Vec<BinanceAggTrade> = self
            .get_json(
                &url,
                &[
                    ("symbol", symbol.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().map(TradeTick::from).collect())
    }

    async fn liquidations(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<Liquidation>, DataError> {
        let url = format!("{}/fapi/v1/allForceOrders", self.config.futures_url);
        let rows: Vec<BinanceForceOrder> = self
            .get_json(
                &url,
                &[
                    ("symbol", symbol.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().map(Liquidation::from).collect())
    }
}

/// ### Raw Payload Example
/// ```json
/// {"symbol": "LTCBTC", "price": "4.00000200"}
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct BinanceTickerPrice {
    pub symbol: String,
    #[serde(deserialize_with = "de_str")]
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binance_config_builder_overrides_defaults() {
        let config = BinanceConfig::default()
            .with_spot_url("http://localhost:9001")
            .with_interval("5m")
            .with_api_key("k")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.spot_url, "http://localhost:9001");
        assert_eq!(config.futures_url, REST_BASE_URL_BINANCE_FUTURES);
        assert_eq!(config.interval, "5m");
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_new_fails_fast_when_required_api_key_is_missing() {
        let actual = BinanceClient::new(BinanceConfig::default().with_api_key_required(true));

        assert!(matches!(
            actual,
            Err(DataError::MissingCredentials("X-MBX-APIKEY"))
        ));

        let with_key = BinanceClient::new(
            BinanceConfig::default()
                .with_api_key_required(true)
                .with_api_key("k"),
        );
        assert!(with_key.is_ok());
    }

    #[test]
    fn test_ticker_price_de() {
        let actual =
            serde_json::from_str::<BinanceTickerPrice>(r#"{"symbol": "LTCBTC", "price": "4.00000200"}"#)
                .expect("failed to deserialize ticker");

        assert_eq!(actual.symbol, "LTCBTC");
        assert_eq!(actual.price, 4.000002);
    }
}
