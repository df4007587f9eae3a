use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// The Monday-to-Sunday scoring window a given date falls into.
///
/// Derived from the calendar on every request, never stored. Leaderboard
/// state rolls over week to week purely by keying boards on `start_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl SeasonWindow {
    /// Window containing `today`: the most recent Monday on or before
    /// `today`, plus six days.
    pub fn containing(today: NaiveDate) -> Self {
        let start_date = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        Self {
            start_date,
            end_date: start_date + Duration::days(6),
        }
    }

    /// Display label, e.g. "3월 2주차" for the second week of March.
    pub fn display_name(&self) -> String {
        let week_of_month = (self.start_date.day() - 1) / 7 + 1;
        format!("{}월 {}주차", self.start_date.month(), week_of_month)
    }
}

/// Wall-clock time remaining in a season, broken into whole units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl TimeLeft {
    const ZERO: TimeLeft = TimeLeft {
        days: 0,
        hours: 0,
        minutes: 0,
    };

    /// Duration from `now` until the season's end of day (23:59:59 on
    /// `end_date`), floored at zero once the window has rolled over.
    pub fn until_season_end(now: NaiveDateTime, end_date: NaiveDate) -> Self {
        let season_end = end_date
            .and_hms_opt(23, 59, 59)
            .expect("23:59:59 is a valid time of day");
        let remaining = season_end - now;
        if remaining < Duration::zero() {
            return Self::ZERO;
        }

        Self {
            days: remaining.num_days(),
            hours: remaining.num_hours() % 24,
            minutes: remaining.num_minutes() % 60,
        }
    }
}
