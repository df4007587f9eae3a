use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    models::ScoredEntry,
    repository::LeaderboardRepository,
    season::{SeasonWindow, TimeLeft},
    types::{RankingEntryView, RankingResponse, RankingResultRequest, RankingResultResponse},
};
use crate::shared::AppError;
use crate::user::{UserId, UserProfileRepository};

/// Shown for scored users whose snapshot is missing from the side-table.
const DEFAULT_NICKNAME: &str = "Unknown";
const DEFAULT_PROFILE_IMAGE: &str = "sf";

/// How far the post-submission neighborhood extends past the caller's
/// before/after ranks on each side.
const NEIGHBORHOOD_SPAN: u64 = 3;

/// Orchestrates season windowing, leaderboard views, and the
/// submit-score-and-report-movement workflow.
pub struct RankingService {
    leaderboard: Arc<dyn LeaderboardRepository>,
    profiles: Arc<dyn UserProfileRepository>,
}

impl RankingService {
    pub fn new(
        leaderboard: Arc<dyn LeaderboardRepository>,
        profiles: Arc<dyn UserProfileRepository>,
    ) -> Self {
        Self {
            leaderboard,
            profiles,
        }
    }

    /// Assembles the full leaderboard for the caller's current season.
    #[instrument(skip(self))]
    pub async fn get_leaderboard(&self, user_id: UserId) -> Result<RankingResponse, AppError> {
        let now = Utc::now().naive_utc();
        let window = SeasonWindow::containing(now.date());
        let week_start = window.start_date;

        let my_ranking = self.leaderboard.rank(week_start, user_id).await?;
        let total_participants = self.leaderboard.total_participants(week_start).await?;
        let top = self.leaderboard.top_entries(week_start).await?;
        let rankings = self.hydrate(week_start, &top, 1).await?;

        Ok(RankingResponse {
            season_name: window.display_name(),
            start_date: window.start_date,
            end_date: window.end_date,
            time_left: TimeLeft::until_season_end(now, window.end_date),
            my_ranking,
            total_participants,
            rankings,
        })
    }

    /// Applies a score gain and reports the caller's rank movement together
    /// with the neighborhood of nearby competitors.
    ///
    /// The before/after reads are not synchronized with other users'
    /// submissions; the movement pair is best-effort under concurrency.
    #[instrument(skip(self, request))]
    pub async fn submit_result(
        &self,
        user_id: UserId,
        request: RankingResultRequest,
    ) -> Result<RankingResultResponse, AppError> {
        let week_start = SeasonWindow::containing(Utc::now().date_naive()).start_date;

        let profile = self
            .profiles
            .profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let old_score = self
            .leaderboard
            .score(week_start, user_id)
            .await?
            .unwrap_or(0);

        let start_rank = match self.leaderboard.rank(week_start, user_id).await? {
            Some(rank) => rank,
            // First contribution: the caller is about to occupy the slot
            // after the current field.
            None => self.leaderboard.total_participants(week_start).await? + 1,
        };

        self.leaderboard
            .add_score(
                week_start,
                user_id,
                request.gained_score,
                &profile.nickname,
                &profile.profile_image,
            )
            .await?;

        let end_rank = self
            .leaderboard
            .rank(week_start, user_id)
            .await?
            .unwrap_or(1);
        let new_score = old_score + request.gained_score;

        // The lower bound anchors on the post-write rank and the upper bound
        // on the pre-write rank, so the window covers both "where I was" and
        // "where I ended up".
        let range_start = end_rank.saturating_sub(NEIGHBORHOOD_SPAN).max(1);
        let total_after = self.leaderboard.total_participants(week_start).await?;
        let range_end = (start_rank + NEIGHBORHOOD_SPAN).min(total_after);

        let entries = self
            .leaderboard
            .entries_in_rank_range(week_start, range_start, range_end)
            .await?;
        let ranking_range = self.hydrate(week_start, &entries, range_start).await?;

        debug!(
            user_id,
            start_rank, end_rank, new_score, "Score submission processed"
        );

        Ok(RankingResultResponse {
            start_rank,
            end_rank,
            rank_up: start_rank as i64 - end_rank as i64,
            old_score,
            new_score,
            range_start,
            range_end,
            ranking_range,
        })
    }

    /// Pushes a changed profile into the current season's snapshot table.
    /// A no-op for users with no contribution this week, so profile edits
    /// never create leaderboard ghosts.
    #[instrument(skip(self, nickname, profile_image))]
    pub async fn update_user_info(
        &self,
        user_id: UserId,
        nickname: &str,
        profile_image: &str,
    ) -> Result<(), AppError> {
        let week_start = SeasonWindow::containing(Utc::now().date_naive()).start_date;
        self.leaderboard
            .update_snapshot_if_present(week_start, user_id, nickname, profile_image)
            .await
    }

    /// Joins score entries with display snapshots, numbering ranks densely
    /// from `first_rank`. Missing snapshots fall back to defaults.
    async fn hydrate(
        &self,
        week_start: chrono::NaiveDate,
        entries: &[ScoredEntry],
        first_rank: u64,
    ) -> Result<Vec<RankingEntryView>, AppError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<UserId> = entries.iter().map(|entry| entry.user_id).collect();
        let snapshots = self.leaderboard.snapshots(week_start, &user_ids).await?;

        Ok(entries
            .iter()
            .enumerate()
            .map(|(offset, entry)| {
                let (nickname, profile_image) = snapshots
                    .get(&entry.user_id)
                    .map(|snapshot| (snapshot.nickname.clone(), snapshot.profile_image.clone()))
                    .unwrap_or_else(|| {
                        (
                            DEFAULT_NICKNAME.to_string(),
                            DEFAULT_PROFILE_IMAGE.to_string(),
                        )
                    });

                RankingEntryView {
                    rank: first_rank + offset as u64,
                    user_id: entry.user_id,
                    nickname,
                    score: entry.score,
                    profile_image,
                }
            })
            .collect())
    }
}
