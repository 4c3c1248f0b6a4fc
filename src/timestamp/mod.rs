use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub type Timestamp = f64;

/// Seconds since the Unix epoch, for stage timings.
pub fn timestamp() -> Timestamp {
  let now = OffsetDateTime::now_utc();
  now.unix_timestamp() as Timestamp + (
    now.nanosecond() as Timestamp / 1000.0 / 1000.0 / 1000.0
  )
}

/// Current UTC time as RFC 3339.
pub fn iso_now() -> String {
  OffsetDateTime::now_utc()
    .format(&Rfc3339)
    .unwrap_or_else(|_| OffsetDateTime::now_utc().unix_timestamp().to_string())
}
