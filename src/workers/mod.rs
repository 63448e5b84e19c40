pub mod match_poller;
pub mod transition_reporter;

pub use match_poller::{MatchPollerWorker, PollOutcome};
pub use transition_reporter::{detect_transitions, TransitionReporterWorker};
