use crate::user::UserId;

/// One user's cumulative score within a season, as stored on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredEntry {
    pub user_id: UserId,
    pub score: i64,
}

/// Display metadata captured alongside a user's score for a season.
///
/// Kept in a side-table with the same lifetime as the score board, so the
/// leaderboard can render without calling back into the account subsystem
/// for every listed user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSnapshot {
    pub nickname: String,
    pub profile_image: String,
}

impl UserSnapshot {
    pub fn new(nickname: impl Into<String>, profile_image: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            profile_image: profile_image.into(),
        }
    }
}
