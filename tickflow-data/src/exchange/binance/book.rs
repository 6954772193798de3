use crate::{
    de::de_str,
    record::{BookLevel, OrderBookSnapshot},
};
use serde::Deserialize;

/// `[price, quantity]` pair; fields are positional strings.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct BinanceLevel(
    #[serde(deserialize_with = "de_str")] pub f64,
    #[serde(deserialize_with = "de_str")] pub f64,
);

/// Order book snapshot, best levels first on both sides. The snapshot carries
/// no event timestamp.
///
/// ### Raw Payload Example
/// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/rest-api#order-book>
/// ```json
/// {
///     "lastUpdateId": 1027024,
///     "bids": [["4.00000000", "431.00000000"]],
///     "asks": [["4.00000200", "12.00000000"]]
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct BinanceOrderBook {
    #[serde(rename = "lastUpdateId")]
    pub last_update_id: u64,
    pub bids: Vec<BinanceLevel>,
    pub asks: Vec<BinanceLevel>,
}

impl From<BinanceLevel> for BookLevel {
    fn from(level: BinanceLevel) -> Self {
        Self {
            price: level.0,
            quantity: level.1,
        }
    }
}

impl From<BinanceOrderBook> for OrderBookSnapshot {
    fn from(book: BinanceOrderBook) -> Self {
        Self {
            bids: book.bids.into_iter().map(BookLevel::from).collect(),
            asks: book.asks.into_iter().map(BookLevel::from).collect(),
        }
    }
}
