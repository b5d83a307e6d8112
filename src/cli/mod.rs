pub mod context;
pub mod stats;
pub mod today;
pub mod write;

use std::{fmt::Display, path::PathBuf};

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use context::{process_context_command, ContextCommand};
use stats::{process_stats_command, StatsCommand};
use today::process_today_command;
use tracing::level_filters::LevelFilter;
use write::process_write_command;

use crate::{
    config::RiverConfig,
    utils::{
        clock::DefaultClock,
        dir::create_notes_default_path,
        logging::{enable_logging, CLI_PREFIX, SESSION_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "River", version, long_about = None)]
#[command(about = "Daily journal that keeps track of your writing streaks", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Notes directory. By default uses $RIVER_HOME or $HOME/river/notes"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Display writing statistics: streaks, daily, weekly and monthly totals")]
    Stats {
        #[command(flatten)]
        command: StatsCommand,
    },
    #[command(about = "Create today's note if it doesn't exist and show its prompts")]
    Today {},
    #[command(
        about = "Write into today's note line by line. Typing time is tracked until input ends"
    )]
    Write {},
    #[command(about = "Print a statistics digest and recent entries for an insight generator")]
    Context {
        #[command(flatten)]
        command: ContextCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let notes_dir = match args.dir {
        Some(v) => v,
        None => create_notes_default_path()?,
    };
    let config = RiverConfig::new(notes_dir);

    let prefix = match args.commands {
        Commands::Write {} => SESSION_PREFIX,
        _ => CLI_PREFIX,
    };
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(prefix, &config.log_dir(), logging_level, args.log)?;

    match args.commands {
        Commands::Stats { command } => process_stats_command(command, &config, &DefaultClock).await,
        Commands::Today {} => process_today_command(&config, &DefaultClock).await,
        Commands::Write {} => process_write_command(&config, Box::new(DefaultClock)).await,
        Commands::Context { command } => {
            process_context_command(command, &config, &DefaultClock).await
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Day a report is computed for. Defaults to today.
#[derive(Debug, Clone, clap::Args)]
pub struct AsOfArgs {
    #[arg(
        long = "as-of",
        help = "Day to compute statistics for. Examples are \"yesterday\", \"3 days ago\", \"15/03/2025\""
    )]
    as_of: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

impl AsOfArgs {
    pub fn resolve(&self, now: DateTime<Local>) -> Result<NaiveDate> {
        let Some(as_of) = &self.as_of else {
            return Ok(now.date_naive());
        };
        match parse_date_string(as_of, now, self.date_style.into()) {
            Ok(v) => Ok(v.date_naive()),
            Err(e) => Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate date {as_of}: {e}"),
                )
                .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone};
    use clap::Parser;

    use super::{Args, AsOfArgs, Commands, DateStyle};

    fn now() -> chrono::DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 20)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap()
    }

    fn as_of(value: Option<&str>, date_style: DateStyle) -> AsOfArgs {
        AsOfArgs {
            as_of: value.map(|v| v.to_string()),
            date_style,
        }
    }

    #[test]
    fn test_as_of_defaults_to_today() -> anyhow::Result<()> {
        let date = as_of(None, DateStyle::Uk).resolve(now())?;
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        Ok(())
    }

    #[test]
    fn test_as_of_natural_language() -> anyhow::Result<()> {
        let date = as_of(Some("yesterday"), DateStyle::Uk).resolve(now())?;
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 19).unwrap());

        let date = as_of(Some("15/03/2024"), DateStyle::Uk).resolve(now())?;
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

        let date = as_of(Some("03/15/2024"), DateStyle::Us).resolve(now())?;
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        Ok(())
    }

    #[test]
    fn test_as_of_rejects_garbage() {
        assert!(as_of(Some("not a date at all"), DateStyle::Uk)
            .resolve(now())
            .is_err());
    }

    #[test]
    fn test_parse_global_arguments() {
        let args = Args::parse_from(["river", "stats", "--weeks", "4", "--dir", "/tmp/notes"]);
        assert_eq!(args.dir, Some("/tmp/notes".into()));
        assert!(!args.log);
        assert!(matches!(args.commands, Commands::Stats { .. }));

        let args = Args::parse_from(["river", "--log", "write"]);
        assert!(args.log);
        assert!(matches!(args.commands, Commands::Write {}));
    }
}
