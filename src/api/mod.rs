pub mod envelope;
pub mod sportsplex;

pub use envelope::MatchListResponse;
pub use sportsplex::{ApiError, ApiResult, SportsPlexClient};
