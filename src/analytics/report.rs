use std::fmt::Write;

use anyhow::Result;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::{
    notes::repository::NoteRepository,
    utils::{
        percentage::{ratio_percentage, Percentage},
        time::format_duration,
    },
};

use super::{
    content_filter::filter_content,
    daily::{collect_daily_stats, daily_window, DailyStat},
    period::{MonthBucket, PeriodSummary, WeekBucket},
    streak::StreakState,
};

/// Number of days listed in [StatsReport::summary].
const SUMMARY_DAYS: u32 = 14;

/// Read-only snapshot of every statistic river shows. Built in one pass and never updated, a
/// new snapshot is collected for every query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub as_of: NaiveDate,
    pub daily: Vec<DailyStat>,
    pub streak: StreakState,
    #[serde(flatten)]
    pub periods: PeriodSummary,
    pub today_words: u64,
    pub daily_goal: u64,
    pub goal_progress: Percentage,
    /// Current streak relative to the number of written days.
    pub consistency: Percentage,
}

impl StatsReport {
    /// Scans the corpus and builds a report as seen on `as_of`.
    #[instrument(skip(repository))]
    pub async fn collect(
        repository: &impl NoteRepository,
        as_of: NaiveDate,
        daily_goal: u64,
    ) -> Result<Self> {
        let daily = collect_daily_stats(repository).await?;
        Ok(Self::from_daily(daily, as_of, daily_goal))
    }

    /// `daily` must be sorted by date.
    pub fn from_daily(daily: Vec<DailyStat>, as_of: NaiveDate, daily_goal: u64) -> Self {
        let streak = StreakState::compute(&daily, as_of);
        let periods = PeriodSummary::aggregate(&daily);
        let today_words = daily
            .binary_search_by_key(&as_of, |v| v.date)
            .map(|index| daily[index].words)
            .unwrap_or(0);

        Self {
            as_of,
            streak,
            today_words,
            daily_goal,
            goal_progress: ratio_percentage(today_words, daily_goal),
            consistency: ratio_percentage(
                streak.current as u64,
                periods.overall.active_days as u64,
            ),
            periods,
            daily,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    pub fn last_weeks(&self, count: usize) -> &[WeekBucket] {
        self.periods.last_weeks(count)
    }

    pub fn last_months(&self, count: usize) -> &[MonthBucket] {
        self.periods.last_months(count)
    }

    /// Last `days` calendar days up to [StatsReport::as_of], missing days included.
    pub fn recent_days(&self, days: u32) -> Vec<(NaiveDate, Option<&DailyStat>)> {
        daily_window(&self.daily, self.as_of, days)
    }

    /// Plain text digest meant as context for an insight generator.
    pub fn summary(&self) -> String {
        let overall = &self.periods.overall;
        let mut summary = String::new();

        // Writing into a String can't fail.
        let _ = writeln!(summary, "Writing Statistics Summary:");
        let _ = writeln!(summary, "- Total Words Written: {}", overall.total_words);
        let _ = writeln!(
            summary,
            "- Total Writing Time: {}",
            format_duration(overall.total_time)
        );
        let _ = writeln!(summary, "- Days Active: {}", overall.active_days);
        let _ = writeln!(summary, "- Current Streak: {} days", self.streak.current);
        let _ = writeln!(summary, "- Longest Streak: {} days", self.streak.longest);
        let _ = writeln!(summary, "- Average Words per Day: {}", overall.average_words());
        match &self.periods.most_productive {
            Some(best) => {
                let _ = writeln!(
                    summary,
                    "- Most Productive Day: {} ({} words)",
                    best.date.format("%b %-d, %Y"),
                    best.words
                );
            }
            None => {
                let _ = writeln!(summary, "- Most Productive Day: none yet");
            }
        }

        let _ = writeln!(summary, "\nRecent Writing Activity (Last {SUMMARY_DAYS} Days):");
        for stat in self.daily.iter().rev().take(SUMMARY_DAYS as usize).rev() {
            let _ = writeln!(
                summary,
                "- {}: {} words in {}",
                stat.date.format("%a, %b %-d"),
                stat.words,
                format_duration(stat.typing_time)
            );
        }
        summary
    }
}

/// Prose of the last `days` days ending at `as_of`, newest first, one header per day. Ghost
/// text and blank lines are dropped and days without prose are omitted. Unreadable notes are
/// skipped.
pub async fn recent_prose(
    repository: &impl NoteRepository,
    as_of: NaiveDate,
    days: u32,
) -> String {
    let mut content = String::new();

    for offset in 0..days {
        let Some(date) = as_of.checked_sub_days(Days::new(offset as u64)) else {
            break;
        };
        let note = match repository.read_note(date).await {
            Ok(Some(v)) => v,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping note for {date}: {e:?}");
                continue;
            }
        };

        let filtered = filter_content(&note.text);
        let lines = filtered
            .prose
            .lines()
            .filter(|v| !v.trim().is_empty())
            .collect::<Vec<_>>();
        if lines.is_empty() {
            continue;
        }

        let _ = writeln!(content, "\n=== {} ===", date.format("%A, %B %-d, %Y"));
        content.push_str(&lines.join("\n"));
        content.push('\n');
    }
    content
}
