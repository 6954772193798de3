use crate::{
    de::{de_str, de_u64_epoch_ms_as_datetime_utc},
    record::Kline,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One row of the kline array response; fields are positional.
///
/// ### Raw Payload Example
/// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/rest-api#klinecandlestick-data>
/// ```json
/// [
///     1499040000000,
///     "0.01634790",
///     "0.80000000",
///     "0.01575800",
///     "0.01577100",
///     "148976.11427815",
///     1499644799999,
///     "2434.19055334",
///     308,
///     "1756.87402397",
///     "28.46694368",
///     "17928899.62484339"
/// ]
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct BinanceKline(
    /// Open time.
    #[serde(deserialize_with = "de_u64_epoch_ms_as_datetime_utc")]
    pub DateTime<Utc>,
    /// Open price.
    #[serde(deserialize_with = "de_str")]
    pub f64,
    /// High price.
    #[serde(deserialize_with = "de_str")]
    pub f64,
    /// Low price.
    #[serde(deserialize_with = "de_str")]
    pub f64,
    /// Close price.
    #[serde(deserialize_with = "de_str")]
    pub f64,
    /// Base asset volume.
    #[serde(deserialize_with = "de_str")]
    pub f64,
    /// Close time (epoch ms).
    pub i64,
    /// Quote asset volume.
    #[serde(deserialize_with = "de_str")]
    pub f64,
    /// Number of trades.
    pub u64,
    /// Taker buy base asset volume.
    #[serde(deserialize_with = "de_str")]
    pub f64,
    /// Taker buy quote asset volume.
    #[serde(deserialize_with = "de_str")]
    pub f64,
    /// Unused trailing field.
    pub String,
);

impl From<BinanceKline> for Kline {
    fn from(kline: BinanceKline) -> Self {
        Self {
            open_time: kline.0,
            open: kline.1,
            high: kline.2,
            low: kline.3,
            close: kline.4,
            volume: kline.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::de::datetime_utc_from_epoch_duration;
    use std::time::Duration;

    #[test]
    fn test_binance_kline_de() {
        struct TestCase {
            input: &'static str,
            expected: Result<Kline, ()>,
        }

        let tests = vec![
            TestCase {
                // TC0: well-formed row is deserialised
                input: r#"
                    [
                        1499040000000,
                        "0.01634790",
                        "0.80000000",
                        "0.01575800",
                        "0.01577100",
                        "148976.11427815",
                        1499644799999,
                        "2434.19055334",
                        308,
                        "1756.87402397",
                        "28.46694368",
                        "17928899.62484339"
                    ]
                "#,
                expected: Ok(Kline {
                    open_time: datetime_utc_from_epoch_duration(Duration::from_millis(
                        1499040000000,
                    )),
                    open: 0.0163479,
                    high: 0.8,
                    low: 0.015758,
                    close: 0.015771,
                    volume: 148976.11427815,
                }),
            },
            TestCase {
                // TC1: truncated row is rejected
                input: r#"[1499040000000, "0.01634790", "0.80000000"]"#,
                expected: Err(()),
            },
            TestCase {
                // TC2: non-numeric price string is rejected
                input: r#"
                    [
                        1499040000000,
                        "open",
                        "0.80000000",
                        "0.01575800",
                        "0.01577100",
                        "148976.11427815",
                        1499644799999,
                        "2434.19055334",
                        308,
                        "1756.87402397",
                        "28.46694368",
                        "17928899.62484339"
                    ]
                "#,
                expected: Err(()),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = serde_json::from_str::<BinanceKline>(test.input).map(Kline::from);
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
    fn test_binance_kline_array_response_de() {
        let input = r#"
            [
                [1499040000000, "1.0", "2.0", "0.5", "1.5", "10.0", 1499040059999, "15.0", 3, "5.0", "7.5", "0"],
                [1499040060000, "1.5", "2.5", "1.0", "2.0", "20.0", 1499040119999, "40.0", 4, "9.0", "18.0", "0"]
            ]
        "#;

        let rows = serde_json::from_str::<Vec<BinanceKline>>(input)
            .expect("failed to deserialize kline page");
        let klines: Vec<Kline> = rows.into_iter().map(Kline::from).collect();

        assert_eq!(klines.len(), 2);
        assert_eq!(klines[0].close, 1.5);
        assert_eq!(klines[1].open_time.timestamp_millis(), 1499040060000);
    }
}
