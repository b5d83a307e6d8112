use std::path::PathBuf;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Note file found while listing the corpus. Only files whose stem is a canonical date make it
/// this far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFile {
    pub date: NaiveDate,
    pub path: PathBuf,
}

/// Raw content of the note for `date`, ghost text included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub date: NaiveDate,
    pub text: String,
}

/// Most typing time a single day can hold. One hour above a day to allow for a DST change.
pub const MAX_TYPING_SECONDS: u64 = 25 * 60 * 60;

/// Per-day sidecar record. Stored as TOML so it stays readable with any text editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarStats {
    pub typing_seconds: u64,
    pub word_count: u64,
}

impl SidecarStats {
    pub fn new(typing_time: Duration, word_count: u64) -> Self {
        Self {
            typing_seconds: typing_time.num_seconds().max(0) as u64,
            word_count,
        }
    }

    /// A record claiming more typing time than a day has is corrupt.
    pub fn is_plausible(&self) -> bool {
        self.typing_seconds <= MAX_TYPING_SECONDS
    }

    pub fn typing_time(&self) -> Duration {
        Duration::seconds(self.typing_seconds.min(MAX_TYPING_SECONDS) as i64)
    }
}
