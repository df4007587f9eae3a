use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::ranking::repository::LeaderboardRepository;
use crate::user::UserProfileRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub leaderboard_repository: Arc<dyn LeaderboardRepository>,
    pub user_profile_repository: Arc<dyn UserProfileRepository>,
}

impl AppState {
    pub fn new(
        leaderboard_repository: Arc<dyn LeaderboardRepository>,
        user_profile_repository: Arc<dyn UserProfileRepository>,
    ) -> Self {
        Self {
            leaderboard_repository,
            user_profile_repository,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::RepositoryError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Repository error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
