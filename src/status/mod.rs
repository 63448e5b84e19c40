pub mod board;
pub mod derive;
pub mod duration;

pub use board::{ClassifiedMatch, InvalidMatch, MatchBoard};
pub use derive::{derive_phase, parse_timestamp, StatusError};
pub use duration::{resolve_duration, resolve_minutes, CricketFormat};
