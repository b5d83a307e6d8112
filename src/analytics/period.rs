use std::{collections::BTreeMap, fmt::Display};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::utils::time::week_start;

use super::{daily::DailyStat, duration_ser};

/// Accumulated words and typing time over a group of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodTotals {
    pub total_words: u64,
    #[serde(with = "duration_ser")]
    pub total_time: Duration,
    pub active_days: u32,
}

impl Default for PeriodTotals {
    fn default() -> Self {
        Self {
            total_words: 0,
            total_time: Duration::zero(),
            active_days: 0,
        }
    }
}

impl PeriodTotals {
    fn add(&mut self, stat: &DailyStat) {
        self.total_words += stat.words;
        self.total_time = self
            .total_time
            .checked_add(&stat.typing_time)
            .unwrap_or(Duration::MAX);
        self.active_days += 1;
    }

    /// Integer average of words per active day, 0 when there are no active days.
    pub fn average_words(&self) -> u64 {
        match self.active_days {
            0 => 0,
            days => self.total_words / days as u64,
        }
    }

    pub fn average_time(&self) -> Duration {
        match self.active_days {
            0 => Duration::zero(),
            days => self.total_time / days as i32,
        }
    }
}

/// Days of a Sunday to Saturday week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekBucket {
    pub week_start: NaiveDate,
    #[serde(flatten)]
    pub totals: PeriodTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Human readable name such as `January 2024`.
    pub fn long_name(&self) -> String {
        self.first_day()
            .map(|v| v.format("%B %Y").to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub month: YearMonth,
    #[serde(flatten)]
    pub totals: PeriodTotals,
}

/// Weekday with the highest average word count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekdayAverage {
    pub weekday: Weekday,
    pub average_words: f64,
}

/// Week and month rollups of a list of daily stats. Buckets are sorted by key. Callers window
/// them by slicing from the end, see [PeriodSummary::last_weeks].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub overall: PeriodTotals,
    pub weeks: Vec<WeekBucket>,
    pub months: Vec<MonthBucket>,
    pub most_productive: Option<DailyStat>,
    pub best_weekday: Option<WeekdayAverage>,
}

impl PeriodSummary {
    pub fn aggregate(stats: &[DailyStat]) -> Self {
        let mut overall = PeriodTotals::default();
        stats.iter().for_each(|v| overall.add(v));

        Self {
            overall,
            weeks: bucket_by_week(stats),
            months: bucket_by_month(stats),
            most_productive: most_productive_day(stats).cloned(),
            best_weekday: best_weekday(stats),
        }
    }

    pub fn last_weeks(&self, count: usize) -> &[WeekBucket] {
        tail(&self.weeks, count)
    }

    pub fn last_months(&self, count: usize) -> &[MonthBucket] {
        tail(&self.months, count)
    }
}

fn tail<T>(values: &[T], count: usize) -> &[T] {
    &values[values.len().saturating_sub(count)..]
}

fn group_by<K: Ord>(
    stats: &[DailyStat],
    key: impl Fn(NaiveDate) -> K,
) -> BTreeMap<K, PeriodTotals> {
    let mut groups = BTreeMap::<K, PeriodTotals>::new();
    for stat in stats {
        groups.entry(key(stat.date)).or_default().add(stat);
    }
    groups
}

/// Groups stats into weeks keyed by the Sunday on or before each date.
pub fn bucket_by_week(stats: &[DailyStat]) -> Vec<WeekBucket> {
    group_by(stats, week_start)
        .into_iter()
        .map(|(week_start, totals)| WeekBucket { week_start, totals })
        .collect()
}

pub fn bucket_by_month(stats: &[DailyStat]) -> Vec<MonthBucket> {
    group_by(stats, YearMonth::of)
        .into_iter()
        .map(|(month, totals)| MonthBucket { month, totals })
        .collect()
}

/// Day with the most words. Ties go to the earliest day.
pub fn most_productive_day(stats: &[DailyStat]) -> Option<&DailyStat> {
    let mut best: Option<&DailyStat> = None;
    for stat in stats {
        match best {
            Some(current) if stat.words <= current.words => {}
            _ => best = Some(stat),
        }
    }
    best
}

/// Weekday with the highest average words per active day, scanning Sunday to Saturday. Ties go
/// to the earlier weekday.
pub fn best_weekday(stats: &[DailyStat]) -> Option<WeekdayAverage> {
    let mut totals = [PeriodTotals::default(); 7];
    for stat in stats {
        totals[stat.date.weekday().num_days_from_sunday() as usize].add(stat);
    }

    let mut weekday = Weekday::Sun;
    let mut best: Option<WeekdayAverage> = None;
    for day_totals in totals {
        if day_totals.active_days > 0 {
            let average_words = day_totals.total_words as f64 / day_totals.active_days as f64;
            if best.map_or(true, |v| average_words > v.average_words) {
                best = Some(WeekdayAverage {
                    weekday,
                    average_words,
                });
            }
        }
        weekday = weekday.succ();
    }
    best
}

#[cfg(test)]
mod tests {
    use chrono::{Days, Duration, NaiveDate, Weekday};

    use super::{
        best_weekday, bucket_by_month, bucket_by_week, most_productive_day, PeriodSummary,
        PeriodTotals, YearMonth,
    };
    use crate::analytics::daily::DailyStat;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stat(date: NaiveDate, words: u64, seconds: i64) -> DailyStat {
        DailyStat {
            date,
            words,
            typing_time: Duration::seconds(seconds),
        }
    }

    #[test]
    fn test_week_buckets_start_on_sunday() {
        let stats = vec![
            stat(date(2024, 1, 6), 10, 60),
            stat(date(2024, 1, 7), 20, 120),
            stat(date(2024, 1, 10), 40, 30),
        ];

        let weeks = bucket_by_week(&stats);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week_start, date(2023, 12, 31));
        assert_eq!(weeks[0].totals.total_words, 10);
        assert_eq!(weeks[1].week_start, date(2024, 1, 7));
        assert_eq!(
            weeks[1].totals,
            PeriodTotals {
                total_words: 60,
                total_time: Duration::seconds(150),
                active_days: 2,
            }
        );
        assert_eq!(weeks[1].totals.average_words(), 30);
        assert_eq!(weeks[1].totals.average_time(), Duration::seconds(75));
    }

    #[test]
    fn test_month_buckets() {
        let stats = vec![
            stat(date(2023, 12, 31), 5, 0),
            stat(date(2024, 1, 1), 7, 0),
            stat(date(2024, 1, 31), 8, 0),
            stat(date(2024, 2, 1), 1, 0),
        ];
        let months = bucket_by_month(&stats);
        let summary = months
            .iter()
            .map(|v| (v.month.to_string(), v.totals.total_words, v.totals.active_days))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("2023-12".to_string(), 5, 1),
                ("2024-01".to_string(), 15, 2),
                ("2024-02".to_string(), 1, 1),
            ]
        );
        assert_eq!(months[1].month.long_name(), "January 2024");
    }

    #[test]
    fn test_week_totals_match_daily_totals() {
        let start = date(2024, 1, 1);
        let stats = (0..90u64)
            .filter(|v| v % 3 != 1)
            .map(|v| stat(start + Days::new(v), v * 7 % 23, v as i64))
            .collect::<Vec<_>>();

        let weeks = bucket_by_week(&stats);
        assert_eq!(
            weeks.iter().map(|v| v.totals.total_words).sum::<u64>(),
            stats.iter().map(|v| v.words).sum::<u64>()
        );
        assert_eq!(
            weeks.iter().map(|v| v.totals.active_days).sum::<u32>() as usize,
            stats.len()
        );
        assert!(weeks.iter().all(|v| v.totals.active_days <= 7));
        assert!(weeks.windows(2).all(|v| v[0].week_start < v[1].week_start));

        let months = bucket_by_month(&stats);
        assert_eq!(
            months.iter().map(|v| v.totals.total_words).sum::<u64>(),
            stats.iter().map(|v| v.words).sum::<u64>()
        );
        assert!(months.iter().all(|v| v.totals.active_days <= 31));
    }

    #[test]
    fn test_most_productive_earliest_tie() {
        let stats = vec![
            stat(date(2024, 1, 1), 4, 0),
            stat(date(2024, 1, 2), 9, 0),
            stat(date(2024, 1, 3), 9, 0),
            stat(date(2024, 1, 4), 2, 0),
        ];
        assert_eq!(most_productive_day(&stats).map(|v| v.date), Some(date(2024, 1, 2)));
        assert_eq!(most_productive_day(&[]), None);

        let silent = vec![stat(date(2024, 1, 1), 0, 0), stat(date(2024, 1, 2), 0, 0)];
        assert_eq!(most_productive_day(&silent).map(|v| v.date), Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_best_weekday() {
        let stats = vec![
            // Monday
            stat(date(2024, 1, 1), 10, 0),
            stat(date(2024, 1, 8), 30, 0),
            // Wednesday
            stat(date(2024, 1, 3), 20, 0),
            // Sunday
            stat(date(2024, 1, 7), 5, 0),
        ];
        let best = best_weekday(&stats).unwrap();
        assert_eq!(best.weekday, Weekday::Mon);
        assert_eq!(best.average_words, 20.);
        assert_eq!(best_weekday(&[]), None);
    }

    #[test]
    fn test_typing_time_saturates() {
        let stats = vec![
            DailyStat {
                date: date(2024, 1, 1),
                words: 1,
                typing_time: Duration::MAX,
            },
            stat(date(2024, 1, 2), 1, 5),
        ];
        let summary = PeriodSummary::aggregate(&stats);
        assert_eq!(summary.overall.total_time, Duration::MAX);
        assert_eq!(summary.weeks[0].totals.total_time, Duration::MAX);
        assert_eq!(summary.overall.active_days, 2);
    }

    #[test]
    fn test_empty_summary() {
        let summary = PeriodSummary::aggregate(&[]);
        assert!(summary.weeks.is_empty());
        assert!(summary.months.is_empty());
        assert_eq!(summary.most_productive, None);
        assert_eq!(summary.overall.average_words(), 0);
        assert_eq!(summary.overall.average_time(), Duration::zero());
        assert!(summary.last_weeks(8).is_empty());
    }

    #[test]
    fn test_windowing_from_tail() {
        let start = date(2024, 1, 7);
        let stats = (0..10u64)
            .map(|week| stat(start + Days::new(week * 7), week, 0))
            .collect::<Vec<_>>();
        let summary = PeriodSummary::aggregate(&stats);

        let last = summary.last_weeks(3);
        assert_eq!(last.len(), 3);
        assert_eq!(last[0].week_start, start + Days::new(49));
        assert_eq!(summary.last_weeks(50).len(), 10);
        assert_eq!(summary.last_months(1)[0].month, YearMonth { year: 2024, month: 3 });
    }
}
