pub mod handlers;
pub mod models;
pub mod repository;
pub mod season;
pub mod service;
pub mod sweeper;
pub mod types;

pub use models::{ScoredEntry, UserSnapshot};
pub use repository::{InMemoryLeaderboardRepository, LeaderboardRepository};
pub use season::{SeasonWindow, TimeLeft};
pub use service::RankingService;
pub use sweeper::{start_sweeper_task, SweeperConfig};
pub use types::{RankingEntryView, RankingResponse, RankingResultRequest, RankingResultResponse};
