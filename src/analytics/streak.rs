use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::utils::time::{is_next_day, previous_day};

use super::daily::DailyStat;

/// Current and longest runs of consecutive written days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StreakState {
    pub current: u32,
    pub longest: u32,
}

impl StreakState {
    /// `stats` must be sorted by date, as returned by
    /// [collect_daily_stats](super::daily::collect_daily_stats).
    pub fn compute(stats: &[DailyStat], today: NaiveDate) -> Self {
        Self {
            current: current_streak(stats, today),
            longest: longest_streak(stats),
        }
    }
}

/// Counts consecutive written days ending today. If today has no note yet the count ends
/// yesterday instead, so a streak isn't reported as broken before the day is over.
pub fn current_streak(stats: &[DailyStat], today: NaiveDate) -> u32 {
    let written = stats.iter().map(|v| v.date).collect::<HashSet<_>>();

    let anchor = if written.contains(&today) {
        Some(today)
    } else {
        previous_day(today).filter(|v| written.contains(v))
    };

    let mut streak = 0;
    let mut day = anchor;
    while let Some(current) = day.filter(|v| written.contains(v)) {
        streak += 1;
        day = previous_day(current);
    }
    streak
}

/// Longest run of consecutive days in an ascending list of stats.
pub fn longest_streak(stats: &[DailyStat]) -> u32 {
    let Some(first) = stats.first() else {
        return 0;
    };

    let mut longest = 1;
    let mut running = 1;
    let mut previous = first.date;
    for stat in &stats[1..] {
        if is_next_day(previous, stat.date) {
            running += 1;
            longest = longest.max(running);
        } else {
            running = 1;
        }
        previous = stat.date;
    }
    longest
}
