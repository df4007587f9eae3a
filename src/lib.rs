// Library crate for the weekly leaderboard service
// This file exposes the public API for integration tests

pub mod ranking;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use ranking::{
    InMemoryLeaderboardRepository, LeaderboardRepository, RankingResponse, RankingResultRequest,
    RankingResultResponse, RankingService, SeasonWindow, TimeLeft,
};
pub use shared::{AppError, AppState};
pub use user::{InMemoryUserProfileRepository, UserProfile, UserProfileRepository};
