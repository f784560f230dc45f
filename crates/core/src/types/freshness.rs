//! Freshness timestamp parsing.
//!
//! Capture components report freshness from page metadata
//! (`og:updated_time`, `article:published_time`), a `Last-Modified` header,
//! or a plain date fallback, so several formats are accepted.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Error, Result};

/// Parse a freshness timestamp into a UTC instant.
///
/// Accepts RFC 3339, RFC 2822 / HTTP-date and bare `YYYY-MM-DD` dates
/// (taken as midnight UTC).
pub fn parse_freshness(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::invalid_input("Freshness timestamp is empty"));
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(Error::invalid_input(format!(
        "Unparseable freshness timestamp: {}",
        raw
    )))
}
