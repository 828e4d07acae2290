//! Caller deadline propagation.
//!
//! gRPC clients send their deadline as a relative `grpc-timeout` header:
//! at most eight ASCII digits followed by a unit (`H`, `M`, `S`, `m`, `u`, `n`).
//! Handlers turn it into an absolute deadline when the call arrives and check
//! it at loop boundaries.

use std::time::Duration;
use tonic::metadata::MetadataMap;

pub const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

/// Parse a `grpc-timeout` header value.
///
/// Returns `None` for malformed values; a malformed timeout is treated the
/// same as no timeout.
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
  if value.len() < 2 || value.len() > 9 {
    return None;
  }
  let (digits, unit) = value.split_at(value.len() - 1);
  if !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  let amount: u64 = digits.parse().ok()?;

  let duration = match unit {
    "H" => Duration::from_secs(amount.checked_mul(60 * 60)?),
    "M" => Duration::from_secs(amount.checked_mul(60)?),
    "S" => Duration::from_secs(amount),
    "m" => Duration::from_millis(amount),
    "u" => Duration::from_micros(amount),
    "n" => Duration::from_nanos(amount),
    _ => return None,
  };
  Some(duration)
}

/// Read the caller's timeout from request metadata, if one was sent.
pub fn request_timeout(metadata: &MetadataMap) -> Option<Duration> {
  let value = metadata.get(GRPC_TIMEOUT_HEADER)?.to_str().ok()?;
  let timeout = parse_grpc_timeout(value);
  if timeout.is_none() {
    tracing::debug!(target: "grpc_client", value, "Ignoring malformed grpc-timeout header");
  }
  timeout
}
