use std::{
    fmt::Write,
    io::{stdout, IsTerminal},
};

use ansi_term::{Colour, Style};
use anyhow::Result;
use clap::Parser;
use tracing::error;

use crate::{
    analytics::report::StatsReport,
    config::RiverConfig,
    notes::repository::FsNoteRepository,
    utils::{clock::Clock, percentage::ratio_percentage, time::format_duration},
};

use super::AsOfArgs;

const BAR_WIDTH: usize = 20;

#[derive(Debug, Parser)]
pub struct StatsCommand {
    #[command(flatten)]
    as_of: AsOfArgs,
    #[arg(long, default_value_t = 14, help = "Number of days in the daily section")]
    days: u32,
    #[arg(long, default_value_t = 8, help = "Number of weeks in the weekly section")]
    weeks: usize,
    #[arg(long, default_value_t = 6, help = "Number of months in the monthly section")]
    months: usize,
    #[arg(long, help = "Daily word goal. Defaults to 500")]
    goal: Option<u64>,
    #[arg(long, help = "Print the report as JSON")]
    json: bool,
}

/// How much history the text dashboard shows.
#[derive(Debug, Clone, Copy)]
pub struct ReportView {
    pub days: u32,
    pub weeks: usize,
    pub months: usize,
}

/// Command to process `stats`. Collects a fresh snapshot of the corpus and prints it. A corpus
/// that can't be scanned is reported as missing data instead of failing the command.
pub async fn process_stats_command(
    StatsCommand {
        as_of,
        days,
        weeks,
        months,
        goal,
        json,
    }: StatsCommand,
    config: &RiverConfig,
    clock: &dyn Clock,
) -> Result<()> {
    let as_of = as_of.resolve(clock.time())?;
    let repository = FsNoteRepository::from_config(config);
    let daily_goal = goal.unwrap_or(config.daily_goal);

    let report = match StatsReport::collect(&repository, as_of, daily_goal).await {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to collect stats {e:?}");
            println!("No data: {e:#}");
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let palette = Palette {
        enabled: stdout().is_terminal(),
    };
    let view = ReportView {
        days,
        weeks,
        months,
    };
    print!("{}", render_report(&report, view, palette));
    Ok(())
}

/// Terminal styling, turned off when stdout is not a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub enabled: bool,
}

impl Palette {
    fn paint(&self, style: Style, text: &str) -> String {
        if self.enabled {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint(Style::new().bold().underline(), text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(Style::new().dimmed(), text)
    }

    fn accent(&self, text: &str) -> String {
        self.paint(Colour::Green.bold(), text)
    }
}

fn bar(value: u64, max: u64) -> String {
    let filled = (*ratio_percentage(value, max).capped() / 100. * BAR_WIDTH as f64).round();
    "█".repeat(filled as usize)
}

pub fn render_report(report: &StatsReport, view: ReportView, palette: Palette) -> String {
    let mut out = String::new();
    if report.is_empty() {
        let _ = writeln!(
            out,
            "No notes yet. Run `river today` to start writing and your stats will show up here."
        );
        return out;
    }

    let overall = &report.periods.overall;
    let streak = &report.streak;
    let _ = writeln!(out, "{}", palette.heading("Overview"));
    let _ = writeln!(
        out,
        "  Current streak  {} (longest {} days)",
        palette.accent(&format!("{} days", streak.current)),
        streak.longest
    );
    let _ = writeln!(out, "  Total words     {}", overall.total_words);
    let _ = writeln!(out, "  Writing time    {}", format_duration(overall.total_time));
    let _ = writeln!(out, "  Days active     {}", overall.active_days);
    let _ = writeln!(
        out,
        "  Daily average   {} words, {}",
        overall.average_words(),
        format_duration(overall.average_time())
    );
    let _ = writeln!(out, "  Consistency     {}", report.consistency);
    let _ = writeln!(
        out,
        "  Today           {}/{} words ({}) {}",
        report.today_words,
        report.daily_goal,
        report.goal_progress,
        palette.accent(&bar(report.today_words, report.daily_goal))
    );

    let recent = report.recent_days(view.days);
    let max_words = recent
        .iter()
        .filter_map(|(_, v)| v.map(|v| v.words))
        .max()
        .unwrap_or(0);
    let _ = writeln!(out, "\n{}", palette.heading(&format!("Last {} days", view.days)));
    for (date, stat) in recent {
        let label = date.format("%a %b %d");
        match stat {
            Some(stat) => {
                let _ = writeln!(
                    out,
                    "  {label}  {:>6} words  {:>9}  {}",
                    stat.words,
                    format_duration(stat.typing_time),
                    bar(stat.words, max_words)
                );
            }
            None => {
                let _ = writeln!(out, "  {}", palette.dim(&format!("{label}  {:>6}", "-")));
            }
        }
    }

    let _ = writeln!(out, "\n{}", palette.heading("Weekly"));
    for week in report.last_weeks(view.weeks) {
        let _ = writeln!(
            out,
            "  Week of {}  {:>6} words  {} days  {}",
            week.week_start.format("%b %d, %Y"),
            week.totals.total_words,
            week.totals.active_days,
            format_duration(week.totals.total_time)
        );
    }

    let _ = writeln!(out, "\n{}", palette.heading("Monthly"));
    for month in report.last_months(view.months) {
        let _ = writeln!(
            out,
            "  {:<15} {:>6} words  {:>2} days  avg {} words/day",
            month.month.long_name(),
            month.totals.total_words,
            month.totals.active_days,
            month.totals.average_words()
        );
    }

    let _ = writeln!(out, "\n{}", palette.heading("Patterns"));
    if let Some(best) = &report.periods.most_productive {
        let _ = writeln!(
            out,
            "  Most productive day  {} ({} words)",
            best.date.format("%a, %b %-d, %Y"),
            best.words
        );
    }
    if let Some(best) = &report.periods.best_weekday {
        let _ = writeln!(
            out,
            "  Best weekday         {} (avg {:.1} words)",
            best.weekday, best.average_words
        );
    }
    out
}
