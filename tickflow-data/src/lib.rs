//! # Tickflow-Data
//! Historical market data ingestion plus the streaming buffer feeding
//! real-time sequence inference.
//!
//! Two independent pipelines share this library:
//! - **Historical**: [`PaginatedFetcher`](fetch::PaginatedFetcher) walks a
//!   time range in bounded pages through a [`RetryPolicy`](retry::RetryPolicy),
//!   gathers the single-shot side channels (order book, funding, trades,
//!   liquidations), and [`assemble`](dataset::assemble::assemble)s everything
//!   into one tagged, column-aligned [`Dataset`](dataset::Dataset) persisted
//!   as CSV.
//! - **Live**: [`spawn_trade_feed`](live::spawn_trade_feed) streams trade
//!   ticks into a [`SlidingWindow`](window::SlidingWindow); once the window
//!   is full, [`InferenceTrigger`](inference::InferenceTrigger) fires the
//!   [`Predictor`](inference::Predictor) exactly once per tick.
//!
//! Remote sources sit behind the [`MarketSource`](exchange::MarketSource)
//! seam ([`BinanceClient`](exchange::binance::BinanceClient) in production),
//! and [`training`] tracks which dataset files a training pass has already
//! consumed.

/// Combined per-cycle dataset: tagged rows, column union, CSV persistence,
/// and the fixed-order assembly of per-kind slices.
pub mod dataset;

/// Serde deserialization helpers for exchange payloads.
pub mod de;

/// All errors generated in `tickflow-data`, classified transient vs fatal.
pub mod error;

/// The [`MarketSource`](exchange::MarketSource) seam and its Binance
/// implementation.
pub mod exchange;

/// Cursor-paginated historical fetch and the full fetch cycle.
pub mod fetch;

/// Streaming inference trigger over the live price window.
pub mod inference;

/// Live WebSocket trade-tick feed with reconnection.
pub mod live;

/// Normalised record types, source tags and time ranges.
pub mod record;

/// Bounded fixed-delay retry for single remote calls.
pub mod retry;

/// Incremental-training bookkeeping and training-pair preparation.
pub mod training;

/// Fixed-capacity sliding window and offline pair cutting.
pub mod window;

pub use dataset::{Dataset, TaggedRecord, assemble::assemble};
pub use error::DataError;
pub use exchange::MarketSource;
pub use fetch::{FetchConfig, PaginatedFetcher};
pub use inference::{InferenceTrigger, PersistenceModel, Prediction, Predictor};
pub use live::{FeedConfig, spawn_trade_feed};
pub use record::{
    BookLevel, FundingRate, Kline, Liquidation, OrderBookSnapshot, Side, SourceKind, SourceSlices,
    TimeRange, TradeTick,
};
pub use retry::RetryPolicy;
pub use training::{TrainedFilesLog, Trainer, TrainingReport, run_training_cycle};
pub use window::{SlidingWindow, TrainingPair, training_pairs};
