use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument};

use super::repository::LeaderboardRepository;

/// Configuration for the expired-board sweeper
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to look for lapsed season boards
    pub sweep_interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(6 * 60 * 60), // 6 hours
        }
    }
}

/// Starts the background task that reclaims season boards whose sliding
/// retention window has lapsed. Reads already treat expired boards as
/// absent; this loop only frees the memory they hold.
#[instrument(skip(leaderboard_repository))]
pub async fn start_sweeper_task(
    leaderboard_repository: Arc<dyn LeaderboardRepository>,
    config: SweeperConfig,
) {
    info!(
        sweep_interval_secs = config.sweep_interval.as_secs(),
        "Starting leaderboard sweeper background task"
    );

    let mut sweep_interval = interval(config.sweep_interval);

    loop {
        sweep_interval.tick().await;

        match leaderboard_repository.remove_expired_boards().await {
            Ok(removed) if removed > 0 => {
                info!(removed, "Reclaimed expired season boards");
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "Leaderboard sweep failed");
            }
        }
    }
}
