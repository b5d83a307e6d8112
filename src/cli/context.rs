use anyhow::Result;
use clap::Parser;

use crate::{
    analytics::report::{recent_prose, StatsReport},
    config::RiverConfig,
    notes::repository::{FsNoteRepository, NoteRepository},
    utils::clock::Clock,
};

use super::AsOfArgs;

#[derive(Debug, Parser)]
pub struct ContextCommand {
    #[command(flatten)]
    as_of: AsOfArgs,
    #[arg(long, default_value_t = 7, help = "Number of days of entries to include")]
    days: u32,
}

/// Command to process `context`. Prints what an insight generator gets to see: the statistics
/// digest followed by recent prose with ghost text removed.
pub async fn process_context_command(
    ContextCommand { as_of, days }: ContextCommand,
    config: &RiverConfig,
    clock: &dyn Clock,
) -> Result<()> {
    let as_of = as_of.resolve(clock.time())?;
    let repository = FsNoteRepository::from_config(config);
    let report = StatsReport::collect(&repository, as_of, config.daily_goal).await?;
    print!("{}", build_context(&report, &repository, days).await);
    Ok(())
}

pub async fn build_context(
    report: &StatsReport,
    repository: &impl NoteRepository,
    days: u32,
) -> String {
    let mut context = report.summary();
    context.push_str("\nRecent Journal Entries:\n");
    let prose = recent_prose(repository, report.as_of, days).await;
    if prose.is_empty() {
        context.push_str("No entries in the last ");
        context.push_str(&days.to_string());
        context.push_str(" days.\n");
    } else {
        context.push_str(&prose);
    }
    context
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use super::build_context;
    use crate::{analytics::report::StatsReport, notes::repository::FsNoteRepository};

    #[tokio::test]
    async fn test_context_excludes_ghost_text() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("2024-01-05.md"),
            "<!-- Friday, January 5, 2024 -->\n<!-- What would make today great? -->\n\nA quiet morning.",
        )?;
        let repository = FsNoteRepository::new(dir.path().to_owned());
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let report = StatsReport::collect(&repository, as_of, 500).await?;

        let context = build_context(&report, &repository, 3).await;
        assert!(context.starts_with("Writing Statistics Summary:"));
        assert!(context.contains("- Total Words Written: 3"));
        assert!(context.contains("=== Friday, January 5, 2024 ===\nA quiet morning.\n"));
        assert!(!context.contains("What would make today great?"));
        Ok(())
    }

    #[tokio::test]
    async fn test_context_without_recent_entries() -> Result<()> {
        let dir = tempdir()?;
        let repository = FsNoteRepository::new(dir.path().to_owned());
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let report = StatsReport::collect(&repository, as_of, 500).await?;

        let context = build_context(&report, &repository, 7).await;
        assert!(context.ends_with("Recent Journal Entries:\nNo entries in the last 7 days.\n"));
        Ok(())
    }
}
