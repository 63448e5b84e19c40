use serde::Deserialize;

use crate::models::MatchRecord;

/// Match-list body; the backend sometimes wraps the array and sometimes doesn't
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MatchListResponse {
    Wrapped { matches: Vec<MatchRecord> },
    Bare(Vec<MatchRecord>),
}

impl MatchListResponse {
    pub fn into_matches(self) -> Vec<MatchRecord> {
        match self {
            MatchListResponse::Wrapped { matches } => matches,
            MatchListResponse::Bare(matches) => matches,
        }
    }
}
