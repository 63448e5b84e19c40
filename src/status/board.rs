use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::models::{LifecyclePhase, MatchRecord};
use crate::status::derive::derive_phase;

/// A match together with the phase derived for it
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedMatch {
    pub phase: LifecyclePhase,
    pub record: MatchRecord,
}

/// A record whose phase could not be derived
#[derive(Debug, Clone, Serialize)]
pub struct InvalidMatch {
    pub reason: String,
    pub record: MatchRecord,
}

/// Matches grouped by derived phase at a single instant
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchBoard {
    /// Instant the board was classified at
    pub evaluated_at: Option<DateTime<Utc>>,

    /// Classified matches in source order
    pub matches: Vec<ClassifiedMatch>,

    /// Records excluded from every phase group
    pub invalid: Vec<InvalidMatch>,
}

impl MatchBoard {
    /// Classify every record at `now` in a single pass
    pub fn classify(now: DateTime<Utc>, records: Vec<MatchRecord>) -> Self {
        let mut matches = Vec::with_capacity(records.len());
        let mut invalid = Vec::new();

        for record in records {
            match derive_phase(now, &record) {
                Ok(phase) => matches.push(ClassifiedMatch { phase, record }),
                Err(e) => {
                    warn!("Skipping match: {}", e);
                    invalid.push(InvalidMatch {
                        reason: e.to_string(),
                        record,
                    });
                }
            }
        }

        Self {
            evaluated_at: Some(now),
            matches,
            invalid,
        }
    }

    /// Matches in the given phase, in source order
    pub fn filter<'a>(
        &'a self,
        phase: &'a LifecyclePhase,
    ) -> impl Iterator<Item = &'a ClassifiedMatch> + 'a {
        self.matches.iter().filter(move |m| &m.phase == phase)
    }

    pub fn phase_of(&self, match_id: &str) -> Option<&LifecyclePhase> {
        self.matches
            .iter()
            .find(|m| m.record.id.as_deref() == Some(match_id))
            .map(|m| &m.phase)
    }

    /// Number of matches per phase
    pub fn counts(&self) -> HashMap<LifecyclePhase, usize> {
        let mut counts = HashMap::new();
        for m in &self.matches {
            *counts.entry(m.phase.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn count(&self, phase: &LifecyclePhase) -> usize {
        self.filter(phase).count()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.invalid.is_empty()
    }
}
