use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::RankingService,
    types::{RankingResponse, RankingResultRequest, RankingResultResponse},
};
use crate::shared::{AppError, AppState};
use crate::user::UserId;

/// HTTP handler for the current season's leaderboard
///
/// GET /rankings/:user_id
/// Returns the season window, the caller's rank, and the full standings
#[instrument(name = "get_rankings", skip(state))]
pub async fn get_rankings(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<RankingResponse>, AppError> {
    let service = RankingService::new(
        Arc::clone(&state.leaderboard_repository),
        Arc::clone(&state.user_profile_repository),
    );
    let response = service.get_leaderboard(user_id).await?;

    Ok(Json(response))
}

/// HTTP handler for submitting a score gain
///
/// POST /rankings/:user_id/results
/// Applies the gain and returns the caller's rank movement with the
/// neighborhood of nearby competitors
#[instrument(name = "submit_result", skip(state, request))]
pub async fn submit_result(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<RankingResultRequest>,
) -> Result<Json<RankingResultResponse>, AppError> {
    info!(user_id, gained_score = request.gained_score, "Processing score submission");

    let service = RankingService::new(
        Arc::clone(&state.leaderboard_repository),
        Arc::clone(&state.user_profile_repository),
    );
    let response = service.submit_result(user_id, request).await?;

    info!(
        user_id,
        start_rank = response.start_rank,
        end_rank = response.end_rank,
        "Score submission completed"
    );

    Ok(Json(response))
}
