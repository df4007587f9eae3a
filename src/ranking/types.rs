use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::season::TimeLeft;
use crate::user::UserId;

/// Body of a score submission after a completed activity.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResultRequest {
    pub gained_score: i64,
}

/// One row of a rendered leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntryView {
    pub rank: u64,
    pub user_id: UserId,
    pub nickname: String,
    pub score: i64,
    pub profile_image: String,
}

/// Full leaderboard view for the current season.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResponse {
    pub season_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub time_left: TimeLeft,
    pub my_ranking: Option<u64>,
    pub total_participants: u64,
    pub rankings: Vec<RankingEntryView>,
}

/// Rank movement report returned right after a score submission, with a
/// neighborhood slice of nearby competitors.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResultResponse {
    pub start_rank: u64,
    pub end_rank: u64,
    /// Positions gained; negative only if unrelated concurrent submissions
    /// pushed the caller down between the two reads.
    pub rank_up: i64,
    pub old_score: i64,
    pub new_score: i64,
    pub range_start: u64,
    pub range_end: u64,
    pub ranking_range: Vec<RankingEntryView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_entry_serializes_camel_case() {
        let entry = RankingEntryView {
            rank: 1,
            user_id: 10,
            nickname: "mina".to_string(),
            score: 9820,
            profile_image: "CAT".to_string(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["userId"], 10);
        assert_eq!(json["profileImage"], "CAT");
    }

    #[test]
    fn absent_my_ranking_serializes_as_null() {
        let response = RankingResponse {
            season_name: "3월 2주차".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 16).unwrap(),
            time_left: TimeLeft {
                days: 2,
                hours: 3,
                minutes: 4,
            },
            my_ranking: None,
            total_participants: 0,
            rankings: Vec::new(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["myRanking"].is_null());
        assert_eq!(json["startDate"], "2025-03-10");
        assert_eq!(json["timeLeft"]["hours"], 3);
    }

    #[test]
    fn request_deserializes_camel_case() {
        let request: RankingResultRequest =
            serde_json::from_str(r#"{"gainedScore": 120}"#).unwrap();
        assert_eq!(request.gained_score, 120);
    }
}
