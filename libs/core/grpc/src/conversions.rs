//! Protobuf timestamp conversions
//!
//! `Laptop.updated_at` travels as Unix seconds; the domain keeps a
//! `DateTime<Utc>`.

use chrono::{DateTime, Utc};

/// Convert DateTime<Utc> to Unix timestamp (seconds since epoch)
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> i64 {
  dt.timestamp()
}

/// Convert Unix timestamp to DateTime<Utc>
///
/// Falls back to current time if the timestamp is out of range.
pub fn timestamp_to_datetime(timestamp: i64) -> DateTime<Utc> {
  DateTime::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now)
}
