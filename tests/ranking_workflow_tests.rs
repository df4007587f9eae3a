//! End-to-end workflow tests through the service layer, including the
//! reference rank-movement scenarios.

use std::sync::Arc;

use futures::future::join_all;
use rankboard::ranking::{
    InMemoryLeaderboardRepository, LeaderboardRepository, RankingResultRequest, RankingService,
    SeasonWindow,
};
use rankboard::user::{InMemoryUserProfileRepository, UserProfile, UserProfileRepository};

const CALLER: u64 = 9_000;

struct TestContext {
    service: RankingService,
    leaderboard: Arc<InMemoryLeaderboardRepository>,
    profiles: Arc<InMemoryUserProfileRepository>,
    week_start: chrono::NaiveDate,
}

async fn setup() -> TestContext {
    let leaderboard = Arc::new(InMemoryLeaderboardRepository::new());
    let profiles = Arc::new(InMemoryUserProfileRepository::new());
    let service = RankingService::new(leaderboard.clone(), profiles.clone());
    let week_start = SeasonWindow::containing(chrono::Utc::now().date_naive()).start_date;

    TestContext {
        service,
        leaderboard,
        profiles,
        week_start,
    }
}

impl TestContext {
    async fn register(&self, user_id: u64, nickname: &str) {
        self.profiles
            .upsert_profile(&UserProfile::new(user_id, nickname, "CAT"))
            .await
            .unwrap();
    }

    /// Seeds a competitor's score directly on the board, bypassing the
    /// submission workflow.
    async fn seed_score(&self, user_id: u64, score: i64) {
        self.leaderboard
            .add_score(self.week_start, user_id, score, "competitor", "DOG")
            .await
            .unwrap();
    }
}

fn gain(gained_score: i64) -> RankingResultRequest {
    RankingResultRequest { gained_score }
}

/// Reference scenario: a caller at rank 152 of 200 with score 4090 gains
/// 120 points and climbs to rank 138.
#[tokio::test]
async fn climbing_fourteen_places_in_a_field_of_two_hundred() {
    let ctx = setup().await;
    ctx.register(CALLER, "climber").await;

    // 137 competitors who stay above the caller's new score,
    ctx.seed_score(CALLER, 4090).await;
    for i in 0..137u64 {
        ctx.seed_score(1_000 + i, 5_000 + i as i64).await;
    }
    // 14 between the old and new scores,
    for i in 0..14u64 {
        ctx.seed_score(2_000 + i, 4_100 + i as i64).await;
    }
    // and 48 below the old score.
    for i in 0..48u64 {
        ctx.seed_score(3_000 + i, 1_000 + i as i64).await;
    }

    assert_eq!(
        ctx.leaderboard
            .rank(ctx.week_start, CALLER)
            .await
            .unwrap(),
        Some(152)
    );

    let result = ctx.service.submit_result(CALLER, gain(120)).await.unwrap();

    assert_eq!(result.start_rank, 152);
    assert_eq!(result.end_rank, 138);
    assert_eq!(result.rank_up, 14);
    assert_eq!(result.old_score, 4090);
    assert_eq!(result.new_score, 4210);
    assert_eq!(result.range_start, 135);
    assert_eq!(result.range_end, 155);

    // 21 contiguous entries numbered from the range start, caller included.
    assert_eq!(result.ranking_range.len(), 21);
    assert_eq!(result.ranking_range[0].rank, 135);
    assert_eq!(result.ranking_range[20].rank, 155);
    let caller_row = result
        .ranking_range
        .iter()
        .find(|entry| entry.user_id == CALLER)
        .unwrap();
    assert_eq!(caller_row.rank, 138);
    assert_eq!(caller_row.score, 4210);
    assert_eq!(caller_row.nickname, "climber");
}

/// Reference scenario: a first-time participant joins 49 existing
/// competitors and lands in 50th place.
#[tokio::test]
async fn first_timer_enters_at_the_back_of_a_field_of_fifty() {
    let ctx = setup().await;
    ctx.register(CALLER, "newcomer").await;

    for i in 0..49u64 {
        ctx.seed_score(1_000 + i, 200 + i as i64).await;
    }

    let result = ctx.service.submit_result(CALLER, gain(100)).await.unwrap();

    assert_eq!(result.old_score, 0);
    assert_eq!(result.new_score, 100);
    assert_eq!(result.start_rank, 50);
    assert_eq!(result.end_rank, 50);
    assert_eq!(result.rank_up, 0);
    assert_eq!(result.range_start, 47);
    assert_eq!(result.range_end, 50);
    assert_eq!(result.ranking_range.len(), 4);
}

#[tokio::test]
async fn concurrent_submissions_for_one_user_all_land() {
    let ctx = setup().await;
    ctx.register(CALLER, "grinder").await;

    let service = Arc::new(RankingService::new(
        ctx.leaderboard.clone(),
        ctx.profiles.clone(),
    ));

    let submissions = (0..50).map(|_| {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.submit_result(CALLER, gain(1)).await })
    });
    for outcome in join_all(submissions).await {
        outcome.unwrap().unwrap();
    }

    assert_eq!(
        ctx.leaderboard
            .score(ctx.week_start, CALLER)
            .await
            .unwrap(),
        Some(50)
    );

    let view = ctx.service.get_leaderboard(CALLER).await.unwrap();
    assert_eq!(view.my_ranking, Some(1));
    assert_eq!(view.rankings[0].score, 50);
}

#[tokio::test]
async fn empty_leaderboard_renders_with_defaults() {
    let ctx = setup().await;
    ctx.register(CALLER, "observer").await;

    let view = ctx.service.get_leaderboard(CALLER).await.unwrap();

    assert_eq!(view.total_participants, 0);
    assert_eq!(view.my_ranking, None);
    assert!(view.rankings.is_empty());

    let window = SeasonWindow::containing(chrono::Utc::now().date_naive());
    assert_eq!(view.season_name, window.display_name());
    assert!(view.time_left.days >= 0);
}

#[tokio::test]
async fn standings_are_dense_and_score_ordered() {
    let ctx = setup().await;
    ctx.register(CALLER, "observer").await;

    for i in 0..10u64 {
        // Two of each score, so the view must also order ties stably.
        ctx.seed_score(1_000 + i, (100 * (i / 2 + 1)) as i64).await;
    }

    let view = ctx.service.get_leaderboard(CALLER).await.unwrap();

    let ranks: Vec<u64> = view.rankings.iter().map(|entry| entry.rank).collect();
    assert_eq!(ranks, (1..=10).collect::<Vec<u64>>());

    for pair in view.rankings.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn submission_rejected_for_unregistered_user() {
    let ctx = setup().await;

    let error = ctx.service.submit_result(CALLER, gain(10)).await.unwrap_err();
    assert!(matches!(error, rankboard::AppError::NotFound(_)));

    let view_total = ctx
        .leaderboard
        .total_participants(ctx.week_start)
        .await
        .unwrap();
    assert_eq!(view_total, 0);
}
