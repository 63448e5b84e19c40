use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::db::TransitionStore;
use crate::models::{BoardUpdate, LifecyclePhase, PhaseTransition};
use crate::status::MatchBoard;

/// Worker that logs phase changes between polls and journals them
pub struct TransitionReporterWorker {
    store: Arc<TransitionStore>,
    update_rx: mpsc::Receiver<BoardUpdate>,
}

impl TransitionReporterWorker {
    /// Create a new transition reporter worker
    pub fn new(store: Arc<TransitionStore>, update_rx: mpsc::Receiver<BoardUpdate>) -> Self {
        Self { store, update_rx }
    }

    /// Run the worker loop until the poller hangs up
    pub async fn run(mut self) {
        info!("Transition reporter started");

        while let Some(update) = self.update_rx.recv().await {
            self.process_update(update).await;
        }

        warn!("Transition reporter channel closed");
    }

    /// Log a board summary and store every transition it implies
    async fn process_update(&self, update: BoardUpdate) -> usize {
        let board = &update.board;

        info!(
            "Board | upcoming {} | live {} | completed {} | cancelled {} | invalid {}",
            board.count(&LifecyclePhase::Upcoming),
            board.count(&LifecyclePhase::Live),
            board.count(&LifecyclePhase::Completed),
            board.count(&LifecyclePhase::Cancelled),
            board.invalid.len(),
        );

        let observed_at = board.evaluated_at.unwrap_or_else(Utc::now);
        let transitions = detect_transitions(update.previous.as_ref(), board, observed_at);

        for transition in &transitions {
            info!(
                "Transition | Match {} | {} | {} -> {}",
                transition.match_id,
                transition.sport,
                transition
                    .from
                    .as_ref()
                    .map(|p| p.as_str())
                    .unwrap_or("new"),
                transition.to,
            );

            if let Err(e) = self.store.insert_transition(transition).await {
                error!("Failed to store transition: {}", e);
            }
        }

        transitions.len()
    }
}

/// Matches whose phase differs from the previous board. Matches without an id
/// cannot be followed across polls and are skipped.
pub fn detect_transitions(
    previous: Option<&MatchBoard>,
    current: &MatchBoard,
    observed_at: DateTime<Utc>,
) -> Vec<PhaseTransition> {
    let before: HashMap<&str, &LifecyclePhase> = previous
        .map(|board| {
            board
                .matches
                .iter()
                .filter_map(|m| m.record.id.as_deref().map(|id| (id, &m.phase)))
                .collect()
        })
        .unwrap_or_default();

    current
        .matches
        .iter()
        .filter_map(|m| {
            let id = m.record.id.as_deref()?;
            let from = before.get(id).copied();

            if from == Some(&m.phase) {
                return None;
            }

            Some(PhaseTransition {
                id: None,
                match_id: id.to_string(),
                sport: m.record.sport.clone(),
                from: from.cloned(),
                to: m.phase.clone(),
                observed_at,
            })
        })
        .collect()
}
