use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, de};
use std::time::Duration;

/// Deserialize a `String` as the desired type.
///
/// Exchange payloads encode most numeric fields as strings (eg/ `"16578.50"`).
pub fn de_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let data = String::deserialize(deserializer)?;
    data.parse::<T>().map_err(de::Error::custom)
}

/// Deserialize a `u64` millisecond unix epoch value as a `DateTime<Utc>`.
pub fn de_u64_epoch_ms_as_datetime_utc<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let epoch_ms = u64::deserialize(deserializer)?;
    Ok(datetime_utc_from_epoch_duration(Duration::from_millis(
        epoch_ms,
    )))
}

/// Construct a `DateTime<Utc>` from a `Duration` since the unix epoch.
pub fn datetime_utc_from_epoch_duration(duration: Duration) -> DateTime<Utc> {
    DateTime::<Utc>::from(std::time::UNIX_EPOCH + duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_de_str() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "de_str")]
            price: f64,
        }

        struct TestCase {
            input: &'static str,
            expected: Result<Wrapper, ()>,
        }

        let tests = vec![
            TestCase {
                // TC0: string-encoded float is parsed
                input: r#"{"price": "16578.50"}"#,
                expected: Ok(Wrapper { price: 16578.50 }),
            },
            TestCase {
                // TC1: non-numeric string fails
                input: r#"{"price": "not-a-number"}"#,
                expected: Err(()),
            },
            TestCase {
                // TC2: raw number (not a string) fails
                input: r#"{"price": 16578.50}"#,
                expected: Err(()),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = serde_json::from_str::<Wrapper>(test.input);
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
    fn test_de_u64_epoch_ms_as_datetime_utc() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "de_u64_epoch_ms_as_datetime_utc")]
            time: DateTime<Utc>,
        }

        let actual = serde_json::from_str::<Wrapper>(r#"{"time": 1672304486865}"#)
            .expect("failed to deserialize epoch ms");

        assert_eq!(
            actual.time,
            datetime_utc_from_epoch_duration(Duration::from_millis(1672304486865))
        );
        assert_eq!(actual.time.timestamp_millis(), 1672304486865);
    }
}
