//! Combined dataset of one fetch cycle: every record tagged with its
//! [`SourceKind`], aligned to one pre-declared column union and persisted as
//! delimited text with a header row.

use crate::{
    error::DataError,
    record::{BookLevel, FundingRate, Kline, Liquidation, Side, SourceKind, TradeTick},
};
use chrono::{DateTime, Utc};
use std::path::Path;

pub mod assemble;

/// Column union across every [`SourceKind`], in serialisation order.
///
/// A column that does not apply to a row's kind is written as an empty field,
/// never as zero, so downstream numeric code cannot mistake "missing" for "0".
pub const COLUMNS: [&str; 11] = [
    "kind",
    "timestamp",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "price",
    "quantity",
    "funding_rate",
    "side",
];

/// One row of the combined dataset, annotated with its originating feed.
///
/// Immutable once created; the assembler is the only producer.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TaggedRecord {
    pub kind: SourceKind,
    pub timestamp: Option<DateTime<Utc>>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub funding_rate: Option<f64>,
    pub side: Option<Side>,
}

impl TaggedRecord {
    fn blank(kind: SourceKind) -> Self {
        Self {
            kind,
            timestamp: None,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            price: None,
            quantity: None,
            funding_rate: None,
            side: None,
        }
    }

    /// Order-book rows carry no timestamp: the snapshot endpoint does not
    /// provide one, and inventing one would misrepresent the data.
    pub fn bid(level: BookLevel) -> Self {
        Self {
            price: Some(level.price),
            quantity: Some(level.quantity),
            ..Self::blank(SourceKind::OrderBookBid)
        }
    }

    pub fn ask(level: BookLevel) -> Self {
        Self {
            price: Some(level.price),
            quantity: Some(level.quantity),
            ..Self::blank(SourceKind::OrderBookAsk)
        }
    }
}

impl From<Kline> for TaggedRecord {
    fn from(kline: Kline) -> Self {
        Self {
            timestamp: Some(kline.open_time),
            open: Some(kline.open),
            high: Some(kline.high),
            low: Some(kline.low),
            close: Some(kline.close),
            volume: Some(kline.volume),
            ..Self::blank(SourceKind::HistoricalKline)
        }
    }
}

impl From<FundingRate> for TaggedRecord {
    fn from(funding: FundingRate) -> Self {
        Self {
            timestamp: Some(funding.time),
            funding_rate: Some(funding.rate),
            ..Self::blank(SourceKind::FundingRate)
        }
    }
}

impl From<TradeTick> for TaggedRecord {
    fn from(trade: TradeTick) -> Self {
        Self {
            timestamp: Some(trade.time),
            price: Some(trade.price),
            quantity: Some(trade.quantity),
            ..Self::blank(SourceKind::Trade)
        }
    }
}

impl From<Liquidation> for TaggedRecord {
    fn from(liquidation: Liquidation) -> Self {
        Self {
            timestamp: Some(liquidation.time),
            price: Some(liquidation.price),
            quantity: Some(liquidation.quantity),
            side: Some(liquidation.side),
            ..Self::blank(SourceKind::Liquidation)
        }
    }
}

/// Ordered, immutable sequence of [`TaggedRecord`]s built once per fetch cycle.
///
/// Never mutated after assembly; each pipeline run writes its own file, so the
/// data directory grows append-only across runs.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Dataset {
    records: Vec<TaggedRecord>,
}

impl Dataset {
    pub fn new(records: Vec<TaggedRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TaggedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows carrying the provided tag.
    pub fn kind_count(&self, kind: SourceKind) -> usize {
        self.records
            .iter()
            .filter(|record| record.kind == kind)
            .count()
    }

    /// Close prices of the candle rows, in row order. This is the series the
    /// training preparation consumes.
    pub fn close_series(&self) -> Vec<f64> {
        self.records
            .iter()
            .filter(|record| record.kind == SourceKind::HistoricalKline)
            .filter_map(|record| record.close)
            .collect()
    }

    /// Serialise to delimited text with a header row.
    ///
    /// Timestamps are written as millisecond unix epochs (what the exchange
    /// emits), keeping the output byte-deterministic for identical input.
    pub fn to_csv_string(&self) -> Result<String, DataError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(COLUMNS)?;

        for record in &self.records {
            writer.write_record([
                record.kind.as_str().to_string(),
                fmt_timestamp(record.timestamp),
                fmt_value(record.open),
                fmt_value(record.high),
                fmt_value(record.low),
                fmt_value(record.close),
                fmt_value(record.volume),
                fmt_value(record.price),
                fmt_value(record.quantity),
                fmt_value(record.funding_rate),
                record.side.map(|side| side.as_str().to_string()).unwrap_or_default(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|error| DataError::Csv(error.to_string()))?;

        String::from_utf8(bytes).map_err(|error| DataError::Csv(error.to_string()))
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), DataError> {
        let encoded = self.to_csv_string()?;
        std::fs::write(path, encoded)?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;

        let header: Vec<&str> = reader.headers()?.iter().collect();
        if header != COLUMNS {
            return Err(DataError::Schema(format!(
                "unexpected dataset header in {}: {header:?}",
                path.display()
            )));
        }

        let mut records = Vec::new();
        for row in reader.records() {
            records.push(parse_row(&row?)?);
        }

        Ok(Self { records })
    }
}

fn fmt_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|time| time.timestamp_millis().to_string())
        .unwrap_or_default()
}

fn fmt_value(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn parse_row(row: &csv::StringRecord) -> Result<TaggedRecord, DataError> {
    let field = |index: usize| -> Result<&str, DataError> {
        row.get(index)
            .ok_or_else(|| DataError::Schema(format!("dataset row is missing column {index}")))
    };

    Ok(TaggedRecord {
        kind: field(0)?.parse()?,
        timestamp: parse_opt_timestamp(field(1)?)?,
        open: parse_opt_value(field(2)?)?,
        high: parse_opt_value(field(3)?)?,
        low: parse_opt_value(field(4)?)?,
        close: parse_opt_value(field(5)?)?,
        volume: parse_opt_value(field(6)?)?,
        price: parse_opt_value(field(7)?)?,
        quantity: parse_opt_value(field(8)?)?,
        funding_rate: parse_opt_value(field(9)?)?,
        side: parse_opt_side(field(10)?)?,
    })
}

fn parse_opt_timestamp(field: &str) -> Result<Option<DateTime<Utc>>, DataError> {
    if field.is_empty() {
        return Ok(None);
    }
    let epoch_ms: i64 = field
        .parse()
        .map_err(|_| DataError::Schema(format!("invalid timestamp field: {field}")))?;
    DateTime::from_timestamp_millis(epoch_ms)
        .map(Some)
        .ok_or_else(|| DataError::Schema(format!("timestamp out of range: {epoch_ms}")))
}

fn parse_opt_value(field: &str) -> Result<Option<f64>, DataError> {
    if field.is_empty() {
        return Ok(None);
    }
    field
        .parse()
        .map(Some)
        .map_err(|_| DataError::Schema(format!("invalid numeric field: {field}")))
}

fn parse_opt_side(field: &str) -> Result<Option<Side>, DataError> {
    if field.is_empty() {
        return Ok(None);
    }
    field.parse().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_dataset() -> Dataset {
        let open_time = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        Dataset::new(vec![
            TaggedRecord::from(Kline {
                open_time,
                open: 61250.0,
                high: 61300.5,
                low: 61200.0,
                close: 61280.25,
                volume: 12.5,
            }),
            TaggedRecord::bid(BookLevel {
                price: 61279.9,
                quantity: 0.42,
            }),
            TaggedRecord::ask(BookLevel {
                price: 61280.4,
                quantity: 1.1,
            }),
            TaggedRecord::from(Liquidation {
                time: open_time,
                price: 61100.0,
                quantity: 0.05,
                side: Side::Sell,
            }),
        ])
    }

    #[test]
    fn test_absent_columns_serialise_as_empty_fields() {
        let encoded = sample_dataset().to_csv_string().unwrap();
        let lines: Vec<&str> = encoded.lines().collect();

        assert_eq!(lines[0], COLUMNS.join(","));
        // Order-book rows have no timestamp and no candle columns.
        assert_eq!(lines[2], "order_book_bid,,,,,,,61279.9,0.42,,");
        // Candle rows have no price/quantity/funding/side columns.
        assert!(lines[1].starts_with("historical_kline,1719792000000,61250,"));
        assert!(lines[1].ends_with(",,,,"));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let dataset = sample_dataset();
        assert_eq!(
            dataset.to_csv_string().unwrap(),
            dataset.to_csv_string().unwrap()
        );
    }

    #[test]
    fn test_write_read_round_trip() {
        let dataset = sample_dataset();
        let path = std::env::temp_dir().join(format!(
            "tickflow-dataset-round-trip-{}.csv",
            std::process::id()
        ));

        dataset.write_csv(&path).unwrap();
        let decoded = Dataset::read_csv(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(decoded, dataset);
    }

    #[test]
    fn test_read_rejects_foreign_header() {
        let path = std::env::temp_dir().join(format!(
            "tickflow-dataset-bad-header-{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, "time,price\n1,2\n").unwrap();

        let actual = Dataset::read_csv(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(actual, Err(DataError::Schema(_))));
    }

    #[test]
    fn test_close_series_takes_candle_rows_only() {
        let dataset = sample_dataset();
        assert_eq!(dataset.close_series(), vec![61280.25]);
    }

    #[test]
    fn test_kind_count() {
        let dataset = sample_dataset();
        assert_eq!(dataset.kind_count(SourceKind::HistoricalKline), 1);
        assert_eq!(dataset.kind_count(SourceKind::OrderBookBid), 1);
        assert_eq!(dataset.kind_count(SourceKind::FundingRate), 0);
    }
}
