use chrono::Duration;

use crate::models::MatchRecord;

pub const DEFAULT_MATCH_MINUTES: i64 = 90;
pub const DEFAULT_CRICKET_MINUTES: i64 = 180;
pub const DEFAULT_FOOTBALL_MINUTES: i64 = 90;
pub const DEFAULT_QUARTER_MINUTES: i64 = 12;

/// Break time added on top of four basketball quarters
const BASKETBALL_BREAK_MINUTES: i64 = 15;

/// Cricket match formats with a known playing length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CricketFormat {
    T20,
    T10,
    Odi,
    Test,
}

impl CricketFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "T20" => Some(CricketFormat::T20),
            "T10" => Some(CricketFormat::T10),
            "ODI" => Some(CricketFormat::Odi),
            "TEST" => Some(CricketFormat::Test),
            _ => None,
        }
    }

    /// Minutes allotted to the format; a Test counts one day of play
    pub fn minutes(&self) -> i64 {
        match self {
            CricketFormat::T20 | CricketFormat::T10 => 180,
            CricketFormat::Odi => 480,
            CricketFormat::Test => 360,
        }
    }
}

/// Effective duration of a match in minutes.
///
/// A positive legacy `duration` field wins. Otherwise the sport name is
/// matched case-insensitively by substring against the per-sport table,
/// and missing or non-positive config values fall back to defaults.
/// Returns `None` when the configured values overflow.
pub fn resolve_minutes(record: &MatchRecord) -> Option<i64> {
    if let Some(minutes) = record.duration.filter(|m| *m > 0) {
        return Some(minutes);
    }

    let sport = record.sport.to_lowercase();
    let config = record.match_config.as_ref();

    if sport.contains("cricket") {
        let minutes = config
            .and_then(|c| c.cricket_config.as_ref())
            .and_then(|c| c.format.as_deref())
            .and_then(CricketFormat::parse)
            .map(|f| f.minutes())
            .unwrap_or(DEFAULT_CRICKET_MINUTES);
        Some(minutes)
    } else if sport.contains("football") {
        let minutes = config
            .and_then(|c| c.football_config.as_ref())
            .and_then(|c| c.duration)
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_FOOTBALL_MINUTES);
        Some(minutes)
    } else if sport.contains("basketball") {
        let quarter = config
            .and_then(|c| c.basketball_config.as_ref())
            .and_then(|c| c.quarter_duration)
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_QUARTER_MINUTES);
        quarter.checked_mul(4)?.checked_add(BASKETBALL_BREAK_MINUTES)
    } else {
        Some(DEFAULT_MATCH_MINUTES)
    }
}

/// Effective duration, or `None` when it does not fit a `chrono::Duration`
pub fn resolve_duration(record: &MatchRecord) -> Option<Duration> {
    Duration::try_minutes(resolve_minutes(record)?)
}
