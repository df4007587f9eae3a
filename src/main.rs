use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rankboard::ranking::{self, InMemoryLeaderboardRepository, SweeperConfig};
use rankboard::shared::AppState;
use rankboard::user::InMemoryUserProfileRepository;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rankboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting weekly leaderboard server");

    // Create shared application state with dependency injection
    let leaderboard_repository = Arc::new(InMemoryLeaderboardRepository::new());
    let user_profile_repository = Arc::new(InMemoryUserProfileRepository::new());

    let app_state = AppState::new(leaderboard_repository.clone(), user_profile_repository);

    // Reclaim expired season boards in the background
    tokio::spawn(ranking::start_sweeper_task(
        leaderboard_repository,
        SweeperConfig::default(),
    ));

    let app = Router::new()
        .route("/rankings/:user_id", get(ranking::handlers::get_rankings))
        .route(
            "/rankings/:user_id/results",
            post(ranking::handlers::submit_result),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
