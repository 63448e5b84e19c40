use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::LifecyclePhase;
use crate::status::MatchBoard;

/// A match observed in a different phase than on the previous poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// Unique row identifier
    pub id: Option<i64>,

    /// Backend match identifier
    pub match_id: String,

    /// Sport as reported by the backend
    pub sport: String,

    /// Phase on the previous poll, `None` the first time the match is seen
    pub from: Option<LifecyclePhase>,

    /// Phase on this poll
    pub to: LifecyclePhase,

    /// Poll time at which the change was seen
    pub observed_at: DateTime<Utc>,
}

/// Update sent from the poller to the transition reporter
#[derive(Debug, Clone)]
pub struct BoardUpdate {
    /// Freshly classified board
    pub board: MatchBoard,

    /// Board from the previous successful poll
    pub previous: Option<MatchBoard>,
}
