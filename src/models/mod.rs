pub mod match_record;
pub mod phase;
pub mod transition;

pub use match_record::{BasketballConfig, CricketConfig, FootballConfig, MatchConfig, MatchRecord};
pub use phase::LifecyclePhase;
pub use transition::{BoardUpdate, PhaseTransition};
