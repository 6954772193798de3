use crate::{
    de::{de_str, de_u64_epoch_ms_as_datetime_utc},
    record::FundingRate,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One funding rate settlement from the derivatives API.
///
/// ### Raw Payload Example
/// See docs: <https://developers.binance.com/docs/derivatives/usds-margined-futures/market-data/rest-api/Get-Funding-Rate-History>
/// ```json
/// {
///     "symbol": "BTCUSDT",
///     "fundingTime": 1698768000000,
///     "fundingRate": "0.00010000",
///     "markPrice": "34287.54619963"
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct BinanceFundingRate {
    pub symbol: String,

    #[serde(
        rename = "fundingTime",
        deserialize_with = "de_u64_epoch_ms_as_datetime_utc"
    )]
    pub time: DateTime<Utc>,

    #[serde(rename = "fundingRate", deserialize_with = "de_str")]
    pub rate: f64,
}

impl From<BinanceFundingRate> for FundingRate {
    fn from(funding: BinanceFundingRate) -> Self {
        Self {
            time: funding.time,
            rate: funding.rate,
        }
    }
}
