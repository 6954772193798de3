use crate::{
    error::DataError,
    record::{FundingRate, Kline, Liquidation, OrderBookSnapshot, TimeRange, TradeTick},
};
use async_trait::async_trait;

/// Binance REST + WebSocket implementation of [`MarketSource`].
pub mod binance;

/// Remote market-data source, one bounded query per feed, keyed by
/// trading-pair symbol.
///
/// The pipeline depends only on this seam: production wires
/// [`binance::BinanceClient`], tests wire mocks with scripted outcomes. Every
/// method signals failure through [`DataError`], whose
/// [`is_transient`](DataError::is_transient) classification drives the retry
/// policy.
#[async_trait]
pub trait MarketSource {
    /// Candles with open time inside `[window.start, window.end)`.
    async fn klines(&self, symbol: &str, window: TimeRange) -> Result<Vec<Kline>, DataError>;

    /// Order book snapshot, both sides, bounded depth per side.
    async fn order_book(&self, symbol: &str, depth: u32) -> Result<OrderBookSnapshot, DataError>;

    /// Most recent funding rate settlements, oldest first.
    async fn funding_rates(&self, symbol: &str, limit: u32) -> Result<Vec<FundingRate>, DataError>;

    /// Most recent aggregate trades.
    async fn trades(&self, symbol: &str, limit: u32) -> Result<Vec<TradeTick>, DataError>;

    /// Most recent forced liquidation orders.
    async fn liquidations(&self, symbol: &str, limit: u32)
    -> Result<Vec<Liquidation>, DataError>;
}
