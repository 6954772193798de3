use crate::{
    dataset::{Dataset, assemble::assemble},
    error::DataError,
    exchange::MarketSource,
    record::{Kline, OrderBookSnapshot, SourceKind, SourceSlices, TimeRange},
    retry::RetryPolicy,
};
use std::future::Future;
use tracing::{debug, info, warn};

/// Tuning for one fetch cycle.
///
/// `Default` matches the exchange's limits: 1-minute candles are capped at
/// 1000 rows per request, so a 1000-minute page span keeps every page inside
/// one response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchConfig {
    pub page_span_minutes: u32,
    pub book_depth: u32,
    pub funding_limit: u32,
    pub trade_limit: u32,
    pub liquidation_limit: u32,
    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_span_minutes: 1000,
            book_depth: 100,
            funding_limit: 100,
            trade_limit: 1000,
            liquidation_limit: 100,
            retry: RetryPolicy::default(),
        }
    }
}

impl FetchConfig {
    pub fn with_page_span_minutes(mut self, page_span_minutes: u32) -> Self {
        self.page_span_minutes = page_span_minutes;
        self
    }

    pub fn with_book_depth(mut self, book_depth: u32) -> Self {
        self.book_depth = book_depth;
        self
    }

    pub fn with_funding_limit(mut self, funding_limit: u32) -> Self {
        self.funding_limit = funding_limit;
        self
    }

    pub fn with_trade_limit(mut self, trade_limit: u32) -> Self {
        self.trade_limit = trade_limit;
        self
    }

    pub fn with_liquidation_limit(mut self, liquidation_limit: u32) -> Self {
        self.liquidation_limit = liquidation_limit;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Walks a historical time range forward in bounded pages and gathers the
/// single-shot side channels, all through one [`RetryPolicy`].
///
/// Generic over [`MarketSource`] so the pagination and degradation logic is
/// testable without a network.
#[derive(Debug)]
pub struct PaginatedFetcher<Source> {
    source: Source,
    config: FetchConfig,
}

impl<Source> PaginatedFetcher<Source>
where
    Source: MarketSource,
{
    pub fn new(source: Source) -> Self {
        Self {
            source,
            config: FetchConfig::default(),
        }
    }

    pub fn with_config(source: Source, config: FetchConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch every candle with open time inside `[range.start, range.end)`.
    ///
    /// The cursor advances by one page span per iteration and never revisits a
    /// covered sub-range, so the requested pages are contiguous,
    /// non-overlapping, and exactly cover the range. An empty page advances
    /// the cursor like any other. Retry exhaustion on any page aborts the
    /// whole call: a partially covered range is never returned as data.
    pub async fn fetch_range(
        &self,
        symbol: &str,
        range: TimeRange,
    ) -> Result<Vec<Kline>, DataError> {
        let span = chrono::Duration::minutes(i64::from(self.config.page_span_minutes.max(1)));
        let mut cursor = range.start();
        let mut klines = Vec::new();
        let mut pages = 0u32;

        while cursor < range.end() {
            let page_end = std::cmp::min(cursor + span, range.end());
            let window = TimeRange::new(cursor, page_end)?;

            let page = self
                .config
                .retry
                .execute("klines", || self.source.klines(symbol, window))
                .await?;

            debug!(
                symbol,
                page = pages,
                start = %window.start(),
                end = %window.end(),
                records = page.len(),
                "fetched kline page"
            );

            klines.extend(page);
            cursor = page_end;
            pages += 1;
        }

        info!(symbol, pages, records = klines.len(), "historical range fetched");
        Ok(klines)
    }

    /// Run one full cycle: paginated candles plus every side channel, merged
    /// into a combined [`Dataset`].
    ///
    /// Side channels degrade to empty slices on failure; only the candle path
    /// (and an invalid range) aborts the cycle.
    pub async fn fetch_cycle(&self, symbol: &str, range: TimeRange) -> Result<Dataset, DataError> {
        let klines = self.fetch_range(symbol, range).await?;

        let book = match self
            .config
            .retry
            .execute("order_book", || {
                self.source.order_book(symbol, self.config.book_depth)
            })
            .await
        {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(symbol, %error, "order book snapshot failed, continuing with empty book");
                OrderBookSnapshot::default()
            }
        };

        let funding_rates = self
            .slice_or_empty(SourceKind::FundingRate, || {
                self.source.funding_rates(symbol, self.config.funding_limit)
            })
            .await;

        let trades = self
            .slice_or_empty(SourceKind::Trade, || {
                self.source.trades(symbol, self.config.trade_limit)
            })
            .await;

        let liquidations = self
            .slice_or_empty(SourceKind::Liquidation, || {
                self.source.liquidations(symbol, self.config.liquidation_limit)
            })
            .await;

        let slices = SourceSlices {
            klines,
            bids: book.bids,
            asks: book.asks,
            funding_rates,
            trades,
            liquidations,
        };

        info!(
            symbol,
            records = slices.record_count(),
            "fetch cycle complete, assembling dataset"
        );

        Ok(assemble(&slices))
    }

    async fn slice_or_empty<T, F, Fut>(&self, kind: SourceKind, operation: F) -> Vec<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Vec<T>, DataError>>,
    {
        match self.config.retry.execute(kind.as_str(), operation).await {
            Ok(records) => records,
            Err(error) => {
                warn!(kind = %kind, %error, "side channel failed, continuing with empty slice");
                Vec::new()
            }
        }
    }
}
