use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::models::{LifecyclePhase, MatchRecord};
use crate::status::duration::resolve_duration;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("invalid match record: {0}")]
    InvalidInput(String),
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp. Values without an offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Scheduled start of a record, or `InvalidInput` when missing or unparseable
pub fn scheduled_start(record: &MatchRecord) -> Result<DateTime<Utc>, StatusError> {
    let raw = record.match_date.as_deref().ok_or_else(|| {
        StatusError::InvalidInput(format!("match {} has no matchDate", record.label()))
    })?;

    parse_timestamp(raw).ok_or_else(|| {
        StatusError::InvalidInput(format!(
            "match {} has unparseable matchDate {:?}",
            record.label(),
            raw
        ))
    })
}

/// Derive the lifecycle phase of a match at `now`.
///
/// A persisted `upcoming` is promoted to `live` once the start has passed and
/// a persisted `live` to `completed` once the effective end has passed. Any
/// other persisted value (e.g. `cancelled`) is returned unchanged. Without a
/// persisted status the phase follows from the start and effective end.
pub fn derive_phase(now: DateTime<Utc>, record: &MatchRecord) -> Result<LifecyclePhase, StatusError> {
    let start = scheduled_start(record)?;
    let end = resolve_duration(record)
        .and_then(|duration| start.checked_add_signed(duration))
        .ok_or_else(|| {
            StatusError::InvalidInput(format!(
                "match {} has an out-of-range duration",
                record.label()
            ))
        })?;

    if let Some(raw) = record.persisted_status() {
        let persisted = LifecyclePhase::parse(raw);
        return Ok(match persisted {
            LifecyclePhase::Upcoming if now >= start => LifecyclePhase::Live,
            LifecyclePhase::Live if now > end => LifecyclePhase::Completed,
            other => other,
        });
    }

    Ok(if now < start {
        LifecyclePhase::Upcoming
    } else if now < end {
        LifecyclePhase::Live
    } else {
        LifecyclePhase::Completed
    })
}
