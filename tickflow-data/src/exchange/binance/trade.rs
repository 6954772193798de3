use crate::{
    de::{de_str, de_u64_epoch_ms_as_datetime_utc},
    record::TradeTick,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One compressed aggregate trade.
///
/// ### Raw Payload Example
/// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/rest-api#compressedaggregate-trades-list>
/// ```json
/// {
///     "a": 26129,
///     "p": "0.01633102",
///     "q": "4.70443515",
///     "f": 27781,
///     "l": 27781,
///     "T": 1498793709153,
///     "m": true,
///     "M": true
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct BinanceAggTrade {
    #[serde(rename = "a")]
    pub id: u64,

    #[serde(rename = "p", deserialize_with = "de_str")]
    pub price: f64,

    #[serde(rename = "q", deserialize_with = "de_str")]
    pub quantity: f64,

    #[serde(rename = "T", deserialize_with = "de_u64_epoch_ms_as_datetime_utc")]
    pub time: DateTime<Utc>,

    #[serde(rename = "m")]
    pub buyer_is_maker: bool,
}

impl From<BinanceAggTrade> for TradeTick {
    fn from(trade: BinanceAggTrade) -> Self {
        Self {
            time: trade.time,
            price: trade.price,
            quantity: trade.quantity,
        }
    }
}

/// Real-time trade pushed on the `<symbol>@trade` raw stream.
///
/// Only the fields the pipeline consumes are modelled. A tick missing the
/// price field fails deserialisation here and is dropped upstream with a
/// logged warning; it never reaches the inference buffer.
///
/// ### Raw Payload Example
/// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/web-socket-streams#trade-streams>
/// ```json
/// {
///     "e": "trade",
///     "E": 1672515782136,
///     "s": "BNBBTC",
///     "t": 12345,
///     "p": "0.001",
///     "q": "100",
///     "T": 1672515782136,
///     "m": true,
///     "M": true
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct BinanceTradeEvent {
    #[serde(rename = "e")]
    pub event: String,

    #[serde(rename = "s")]
    pub symbol: String,

    #[serde(rename = "T", deserialize_with = "de_u64_epoch_ms_as_datetime_utc")]
    pub time: DateTime<Utc>,

    #[serde(rename = "p", deserialize_with = "de_str")]
    pub price: f64,

    #[serde(rename = "q", deserialize_with = "de_str")]
    pub quantity: f64,
}

impl From<BinanceTradeEvent> for TradeTick {
    fn from(event: BinanceTradeEvent) -> Self {
        Self {
            time: event.time,
            price: event.price,
            quantity: event.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::de::datetime_utc_from_epoch_duration;
    use std::time::Duration;

    #[test]
    fn test_binance_agg_trade_de() {
        let input = r#"
            {
                "a": 26129,
                "p": "0.01633102",
                "q": "4.70443515",
                "f": 27781,
                "l": 27781,
                "T": 1498793709153,
                "m": true,
                "M": true
            }
        "#;

        let actual = serde_json::from_str::<BinanceAggTrade>(input)
            .map(TradeTick::from)
            .expect("failed to deserialize aggregate trade");

        assert_eq!(
            actual,
            TradeTick {
                time: datetime_utc_from_epoch_duration(Duration::from_millis(1498793709153)),
                price: 0.01633102,
                quantity: 4.70443515,
            }
        );
    }

    #[test]
    fn test_binance_trade_event_de() {
        struct TestCase {
            input: &'static str,
            expected: Result<TradeTick, ()>,
        }

        let tests = vec![
            TestCase {
                // TC0: well-formed tick is deserialised
                input: r#"
                    {
                        "e": "trade",
                        "E": 1672515782136,
                        "s": "BNBBTC",
                        "t": 12345,
                        "p": "0.001",
                        "q": "100",
                        "T": 1672515782136,
                        "m": true,
                        "M": true
                    }
                "#,
                expected: Ok(TradeTick {
                    time: datetime_utc_from_epoch_duration(Duration::from_millis(1672515782136)),
                    price: 0.001,
                    quantity: 100.0,
                }),
            },
            TestCase {
                // TC1: tick missing the price field is rejected
                input: r#"
                    {
                        "e": "trade",
                        "E": 1672515782136,
                        "s": "BNBBTC",
                        "t": 12345,
                        "q": "100",
                        "T": 1672515782136,
                        "m": true,
                        "M": true
                    }
                "#,
                expected: Err(()),
            },
            TestCase {
                // TC2: non-numeric price is rejected
                input: r#"
                    {
                        "e": "trade",
                        "s": "BNBBTC",
                        "p": "abc",
                        "q": "100",
                        "T": 1672515782136
                    }
                "#,
                expected: Err(()),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = serde_json::from_str::<BinanceTradeEvent>(test.input).map(TradeTick::from);
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
}
