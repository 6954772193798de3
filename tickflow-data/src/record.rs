use crate::error::DataError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag identifying which remote feed a record came from.
///
/// Downstream consumers filter the combined dataset by this tag rather than
/// inferring provenance from schema shape.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    HistoricalKline,
    OrderBookBid,
    OrderBookAsk,
    FundingRate,
    Trade,
    Liquidation,
}

impl SourceKind {
    /// Fixed assembly order. Slices are concatenated in exactly this order so the
    /// combined dataset is deterministic.
    pub const ALL: [SourceKind; 6] = [
        SourceKind::HistoricalKline,
        SourceKind::OrderBookBid,
        SourceKind::OrderBookAsk,
        SourceKind::FundingRate,
        SourceKind::Trade,
        SourceKind::Liquidation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::HistoricalKline => "historical_kline",
            SourceKind::OrderBookBid => "order_book_bid",
            SourceKind::OrderBookAsk => "order_book_ask",
            SourceKind::FundingRate => "funding_rate",
            SourceKind::Trade => "trade",
            SourceKind::Liquidation => "liquidation",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourceKind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "historical_kline" => Ok(SourceKind::HistoricalKline),
            "order_book_bid" => Ok(SourceKind::OrderBookBid),
            "order_book_ask" => Ok(SourceKind::OrderBookAsk),
            "funding_rate" => Ok(SourceKind::FundingRate),
            "trade" => Ok(SourceKind::Trade),
            "liquidation" => Ok(SourceKind::Liquidation),
            other => Err(DataError::Schema(format!("unknown source kind: {other}"))),
        }
    }
}

/// Side of a trade or liquidation order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Side {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(DataError::Schema(format!("unknown side: {other}"))),
        }
    }
}

/// Half-open UTC time window `[start, end)` to fetch.
///
/// [`new`](Self::new) is the only way to build one and enforces
/// `start < end`; the fetcher advances through a range monotonically and
/// never revisits a covered sub-range.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DataError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(DataError::InvalidRange { start, end })
        }
    }

    /// Range covering the `span` immediately before `end`.
    pub fn lookback_from(end: DateTime<Utc>, span: chrono::Duration) -> Result<Self, DataError> {
        Self::new(end - span, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// Both sides of an order book snapshot, best levels first.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct OrderBookSnapshot {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

/// Normalised candlestick covering one interval.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct Kline {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One price level of an order book snapshot. Whether it is a bid or an ask is
/// decided by which side of the snapshot it was taken from.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct BookLevel {
    pub price: f64,
    pub quantity: f64,
}

/// Normalised funding rate settlement.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct FundingRate {
    pub time: DateTime<Utc>,
    pub rate: f64,
}

/// Normalised public trade.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct TradeTick {
    pub time: DateTime<Utc>,
    pub price: f64,
    pub quantity: f64,
}

/// Normalised forced liquidation order.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct Liquidation {
    pub time: DateTime<Utc>,
    pub price: f64,
    pub quantity: f64,
    pub side: Side,
}

/// Per-kind result slices of one fetch cycle, input to assembly.
///
/// A slice left empty is valid: side channels degrade to empty on failure
/// rather than aborting the cycle.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct SourceSlices {
    pub klines: Vec<Kline>,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    pub funding_rates: Vec<FundingRate>,
    pub trades: Vec<TradeTick>,
    pub liquidations: Vec<Liquidation>,
}

impl SourceSlices {
    /// Total records across every kind.
    pub fn record_count(&self) -> usize {
        self.klines.len()
            + self.bids.len()
            + self.asks.len()
            + self.funding_rates.len()
            + self.trades.len()
            + self.liquidations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_source_kind_tag_round_trip() {
        for kind in SourceKind::ALL {
            let actual = SourceKind::from_str(kind.as_str());
            assert_eq!(actual, Ok(kind), "round trip failed for {kind}");
        }
    }

    #[test]
    fn test_source_kind_from_str_rejects_unknown_tag() {
        struct TestCase {
            input: &'static str,
            expected: Result<SourceKind, ()>,
        }

        let tests = vec![
            TestCase {
                // TC0: stored tag parses
                input: "historical_kline",
                expected: Ok(SourceKind::HistoricalKline),
            },
            TestCase {
                // TC1: stored tag parses
                input: "order_book_ask",
                expected: Ok(SourceKind::OrderBookAsk),
            },
            TestCase {
                // TC2: variant name is not a tag
                input: "HistoricalKline",
                expected: Err(()),
            },
            TestCase {
                // TC3: unknown tag is rejected
                input: "open_interest",
                expected: Err(()),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = SourceKind::from_str(test.input);
            match (actual, test.expected) {
                (Ok(actual), Ok(expected)) => {
                    assert_eq!(actual, expected, "TC{} failed", index)
                }
                (Err(_), Err(_)) => {
                    // Test passed
                }
                (actual, expected) => {
                    panic!(
                        "TC{index} failed because actual != expected. \nActual: {actual:?}\nExpected: {expected:?}\n"
                    );
                }
            }
        }
    }

    #[test]
    fn test_time_range_rejects_empty_and_inverted_ranges() {
        use chrono::TimeZone;
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();

        assert!(TimeRange::new(start, start + chrono::Duration::minutes(1)).is_ok());
        assert_eq!(
            TimeRange::new(start, start),
            Err(DataError::InvalidRange { start, end: start })
        );
        assert!(matches!(
            TimeRange::new(start + chrono::Duration::minutes(1), start),
            Err(DataError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_time_range_lookback_from() {
        use chrono::TimeZone;
        let end = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();

        let range = TimeRange::lookback_from(end, chrono::Duration::minutes(2000)).unwrap();

        assert_eq!(range.end(), end);
        assert_eq!(range.duration(), chrono::Duration::minutes(2000));
    }

    #[test]
    fn test_assembly_order_is_stable() {
        let tags: Vec<&str> = SourceKind::ALL.iter().map(|kind| kind.as_str()).collect();
        assert_eq!(
            tags,
            vec![
                "historical_kline",
                "order_book_bid",
                "order_book_ask",
                "funding_rate",
                "trade",
                "liquidation",
            ]
        );
    }
}
