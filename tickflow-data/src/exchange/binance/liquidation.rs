use crate::{
    de::{de_str, de_u64_epoch_ms_as_datetime_utc},
    record::{Liquidation, Side},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One forced liquidation order from the derivatives API.
///
/// The pipeline requires `time`, `price`, `origQty` and `side`. A response
/// missing any of them fails deserialisation, which the fetch layer degrades
/// to an empty liquidation slice with a logged warning rather than aborting
/// the cycle.
///
/// ### Raw Payload Example
/// See docs: <https://developers.binance.com/docs/derivatives/usds-margined-futures/market-data/rest-api>
/// ```json
/// {
///     "symbol": "BTCUSDT",
///     "price": "7918.33",
///     "origQty": "0.014",
///     "executedQty": "0.014",
///     "averagePrice": "7918.31",
///     "status": "FILLED",
///     "timeInForce": "IOC",
///     "type": "LIMIT",
///     "side": "SELL",
///     "time": 1568014460893
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct BinanceForceOrder {
    pub symbol: String,

    #[serde(deserialize_with = "de_str")]
    pub price: f64,

    #[serde(rename = "origQty", deserialize_with = "de_str")]
    pub quantity: f64,

    pub side: Side,

    #[serde(deserialize_with = "de_u64_epoch_ms_as_datetime_utc")]
    pub time: DateTime<Utc>,
}

impl From<BinanceForceOrder> for Liquidation {
    fn from(order: BinanceForceOrder) -> Self {
        Self {
            time: order.time,
            price: order.price,
            quantity: order.quantity,
            side: order.side,
        }
    }
}
