use std::{path::PathBuf, time::Duration};

/// Seconds without a keystroke after which typing time stops accruing.
pub const DEFAULT_IDLE_CUTOFF_SECONDS: i64 = 60;
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_DAILY_GOAL: u64 = 500;

/// Configuration handed to every component at construction. Nothing below the CLI looks up
/// paths on its own.
#[derive(Debug, Clone)]
pub struct RiverConfig {
    pub notes_dir: PathBuf,
    pub idle_cutoff: chrono::Duration,
    pub tick_interval: Duration,
    pub daily_goal: u64,
}

impl RiverConfig {
    pub fn new(notes_dir: PathBuf) -> Self {
        Self {
            notes_dir,
            idle_cutoff: chrono::Duration::seconds(DEFAULT_IDLE_CUTOFF_SECONDS),
            tick_interval: DEFAULT_TICK_INTERVAL,
            daily_goal: DEFAULT_DAILY_GOAL,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.notes_dir.join(".logs")
    }
}
