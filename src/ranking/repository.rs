use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::{ScoredEntry, UserSnapshot};
use crate::shared::AppError;
use crate::user::UserId;

/// How long a season board survives after its last write.
const DEFAULT_RETENTION_DAYS: i64 = 14;

/// Trait for the score-ordered season store.
///
/// Every operation takes the season key (`week_start`) explicitly; callers
/// compute it once per request from the calendar. There is no hidden
/// "current season" state in the store.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Atomically adds `delta` to the user's cumulative score (creating the
    /// entry at `delta` if absent), upserts the display snapshot, and
    /// refreshes the season's retention window. Concurrent calls for the
    /// same user must all be reflected — no lost updates.
    async fn add_score(
        &self,
        week_start: NaiveDate,
        user_id: UserId,
        delta: i64,
        nickname: &str,
        profile_image: &str,
    ) -> Result<(), AppError>;

    /// 1-based rank by descending score, or `None` if the user has no entry.
    async fn rank(&self, week_start: NaiveDate, user_id: UserId) -> Result<Option<u64>, AppError>;

    async fn score(&self, week_start: NaiveDate, user_id: UserId) -> Result<Option<i64>, AppError>;

    /// Number of distinct users with at least one contribution this season.
    async fn total_participants(&self, week_start: NaiveDate) -> Result<u64, AppError>;

    /// Full descending score listing. Callers truncate for display.
    async fn top_entries(&self, week_start: NaiveDate) -> Result<Vec<ScoredEntry>, AppError>;

    /// Entries between two 1-based ranks, inclusive, descending by score.
    /// Clipped to the population; empty when `start_rank` is past the end.
    async fn entries_in_rank_range(
        &self,
        week_start: NaiveDate,
        start_rank: u64,
        end_rank: u64,
    ) -> Result<Vec<ScoredEntry>, AppError>;

    /// Display snapshots for the given users. Users without a stored
    /// snapshot are simply absent; callers supply defaults.
    async fn snapshots(
        &self,
        week_start: NaiveDate,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, UserSnapshot>, AppError>;

    /// Refreshes a user's snapshot only if they already have a score entry
    /// this season. Prevents metadata-only writes from resurrecting or
    /// populating stale seasons.
    async fn update_snapshot_if_present(
        &self,
        week_start: NaiveDate,
        user_id: UserId,
        nickname: &str,
        profile_image: &str,
    ) -> Result<(), AppError>;

    /// Drops boards whose retention window has lapsed. Returns how many
    /// were removed. Called by the background sweeper; reads already treat
    /// expired boards as absent, so this only reclaims memory.
    async fn remove_expired_boards(&self) -> Result<usize, AppError>;
}

/// Ordering key for one board entry: descending score, then earliest first
/// contribution, then user id. The sequence component makes equal scores
/// resolve deterministically (earliest contributor ranks higher).
type OrderKey = (Reverse<i64>, u64, UserId);

#[derive(Debug)]
struct SeasonBoard {
    scores: HashMap<UserId, i64>,
    order: BTreeSet<OrderKey>,
    snapshots: HashMap<UserId, UserSnapshot>,
    first_seen: HashMap<UserId, u64>,
    next_seq: u64,
    expires_at: DateTime<Utc>,
}

impl SeasonBoard {
    fn new(expires_at: DateTime<Utc>) -> Self {
        Self {
            scores: HashMap::new(),
            order: BTreeSet::new(),
            snapshots: HashMap::new(),
            first_seen: HashMap::new(),
            next_seq: 0,
            expires_at,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    fn apply_delta(&mut self, user_id: UserId, delta: i64) {
        let seq = match self.first_seen.get(&user_id) {
            Some(&seq) => seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.first_seen.insert(user_id, seq);
                seq
            }
        };

        let old_score = self.scores.get(&user_id).copied();
        if let Some(old_score) = old_score {
            self.order.remove(&(Reverse(old_score), seq, user_id));
        }

        let new_score = old_score.unwrap_or(0) + delta;
        self.scores.insert(user_id, new_score);
        self.order.insert((Reverse(new_score), seq, user_id));
    }

    fn rank_of(&self, user_id: UserId) -> Option<u64> {
        let score = *self.scores.get(&user_id)?;
        let seq = *self.first_seen.get(&user_id)?;
        let key: OrderKey = (Reverse(score), seq, user_id);
        // Linear in board size, which is one week's worth of participants.
        Some(self.order.range(..key).count() as u64 + 1)
    }

    fn entries_between(&self, start_rank: u64, end_rank: u64) -> Vec<ScoredEntry> {
        if start_rank == 0 || start_rank > end_rank {
            return Vec::new();
        }

        self.order
            .iter()
            .skip(start_rank as usize - 1)
            .take((end_rank - start_rank + 1) as usize)
            .map(|&(Reverse(score), _, user_id)| ScoredEntry { user_id, score })
            .collect()
    }
}

/// In-memory implementation of LeaderboardRepository.
///
/// All boards live behind one `RwLock`: `add_score` runs under the write
/// lock, so deltas are linearizable; reads take the read lock and see a
/// consistent snapshot, deliberately unsynchronized with later writers.
pub struct InMemoryLeaderboardRepository {
    boards: RwLock<HashMap<NaiveDate, SeasonBoard>>,
    retention: Duration,
}

impl Default for InMemoryLeaderboardRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLeaderboardRepository {
    pub fn new() -> Self {
        Self::with_retention(Duration::days(DEFAULT_RETENTION_DAYS))
    }

    /// Overrides the sliding retention window. Tests use short windows to
    /// exercise expiry without waiting.
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            boards: RwLock::new(HashMap::new()),
            retention,
        }
    }

    fn live_board<'a>(
        boards: &'a HashMap<NaiveDate, SeasonBoard>,
        week_start: NaiveDate,
    ) -> Option<&'a SeasonBoard> {
        boards
            .get(&week_start)
            .filter(|board| !board.is_expired(Utc::now()))
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryLeaderboardRepository {
    #[instrument(skip(self, nickname, profile_image))]
    async fn add_score(
        &self,
        week_start: NaiveDate,
        user_id: UserId,
        delta: i64,
        nickname: &str,
        profile_image: &str,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let mut boards = self.boards.write().await;

        let board = boards
            .entry(week_start)
            .or_insert_with(|| SeasonBoard::new(now + self.retention));
        if board.is_expired(now) {
            *board = SeasonBoard::new(now + self.retention);
        }

        board.apply_delta(user_id, delta);
        board
            .snapshots
            .insert(user_id, UserSnapshot::new(nickname, profile_image));
        // Sliding expiry: every write extends the season's retention.
        board.expires_at = now + self.retention;

        debug!(
            week_start = %week_start,
            user_id,
            delta,
            "Score delta applied"
        );
        Ok(())
    }

    async fn rank(&self, week_start: NaiveDate, user_id: UserId) -> Result<Option<u64>, AppError> {
        let boards = self.boards.read().await;
        Ok(Self::live_board(&boards, week_start).and_then(|board| board.rank_of(user_id)))
    }

    async fn score(&self, week_start: NaiveDate, user_id: UserId) -> Result<Option<i64>, AppError> {
        let boards = self.boards.read().await;
        Ok(Self::live_board(&boards, week_start)
            .and_then(|board| board.scores.get(&user_id).copied()))
    }

    async fn total_participants(&self, week_start: NaiveDate) -> Result<u64, AppError> {
        let boards = self.boards.read().await;
        Ok(Self::live_board(&boards, week_start)
            .map(|board| board.scores.len() as u64)
            .unwrap_or(0))
    }

    async fn top_entries(&self, week_start: NaiveDate) -> Result<Vec<ScoredEntry>, AppError> {
        let boards = self.boards.read().await;
        let entries = Self::live_board(&boards, week_start)
            .map(|board| {
                board
                    .order
                    .iter()
                    .map(|&(Reverse(score), _, user_id)| ScoredEntry { user_id, score })
                    .collect()
            })
            .unwrap_or_default();
        Ok(entries)
    }

    async fn entries_in_rank_range(
        &self,
        week_start: NaiveDate,
        start_rank: u64,
        end_rank: u64,
    ) -> Result<Vec<ScoredEntry>, AppError> {
        let boards = self.boards.read().await;
        let entries = Self::live_board(&boards, week_start)
            .map(|board| board.entries_between(start_rank, end_rank))
            .unwrap_or_default();
        Ok(entries)
    }

    async fn snapshots(
        &self,
        week_start: NaiveDate,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, UserSnapshot>, AppError> {
        let boards = self.boards.read().await;
        let Some(board) = Self::live_board(&boards, week_start) else {
            return Ok(HashMap::new());
        };

        Ok(user_ids
            .iter()
            .filter_map(|user_id| {
                board
                    .snapshots
                    .get(user_id)
                    .map(|snapshot| (*user_id, snapshot.clone()))
            })
            .collect())
    }

    #[instrument(skip(self, nickname, profile_image))]
    async fn update_snapshot_if_present(
        &self,
        week_start: NaiveDate,
        user_id: UserId,
        nickname: &str,
        profile_image: &str,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let mut boards = self.boards.write().await;

        let Some(board) = boards.get_mut(&week_start).filter(|b| !b.is_expired(now)) else {
            return Ok(());
        };

        // Snapshot-only writes neither create entries nor extend retention.
        if board.scores.contains_key(&user_id) {
            board
                .snapshots
                .insert(user_id, UserSnapshot::new(nickname, profile_image));
            debug!(week_start = %week_start, user_id, "Snapshot refreshed");
        }

        Ok(())
    }

    async fn remove_expired_boards(&self) -> Result<usize, AppError> {
        let now = Utc::now();
        let mut boards = self.boards.write().await;
        let before = boards.len();
        boards.retain(|_, board| !board.is_expired(now));
        Ok(before - boards.len())
    }
}
