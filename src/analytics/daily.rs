use anyhow::Result;
use chrono::{Days, Duration, NaiveDate};
use futures::{future, stream, StreamExt};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::notes::{entities::NoteFile, repository::NoteRepository};

use super::{content_filter::note_word_count, duration_ser};

/// Number of notes read concurrently during a scan.
const PARALLEL_READS: usize = 4;

/// Statistics for a single day that has a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub words: u64,
    #[serde(with = "duration_ser")]
    pub typing_time: Duration,
}

/// Builds a [DailyStat] for every readable dated note, sorted by date.
///
/// Only a failure to list the corpus is an error. Notes that can't be read or decoded are
/// skipped, and a missing or malformed sidecar means zero typing time. An empty note still
/// counts as a written day.
#[instrument(skip(repository))]
pub async fn collect_daily_stats(repository: &impl NoteRepository) -> Result<Vec<DailyStat>> {
    let files = repository.list_notes().await?;
    debug!("Found {} note files", files.len());

    let mut stats = stream::iter(files)
        .map(|file| daily_stat(repository, file))
        .buffered(PARALLEL_READS)
        .filter_map(future::ready)
        .collect::<Vec<_>>()
        .await;

    stats.sort_by_key(|v| v.date);
    Ok(stats)
}

async fn daily_stat(repository: &impl NoteRepository, file: NoteFile) -> Option<DailyStat> {
    let note = match repository.read_note(file.date).await {
        Ok(Some(note)) => note,
        Ok(None) => {
            debug!("Note {:?} disappeared during the scan", file.path);
            return None;
        }
        Err(e) => {
            warn!("Skipping note {:?}: {e:?}", file.path);
            return None;
        }
    };

    let typing_time = repository
        .read_sidecar(file.date)
        .await
        .map(|v| v.typing_time())
        .unwrap_or_else(Duration::zero);

    Some(DailyStat {
        date: file.date,
        words: note_word_count(&note.text),
        typing_time,
    })
}

/// One entry per calendar day of the `days` long window ending at `end`, oldest first. Days
/// without a note are `None`.
pub fn daily_window(
    stats: &[DailyStat],
    end: NaiveDate,
    days: u32,
) -> Vec<(NaiveDate, Option<&DailyStat>)> {
    (0..days)
        .rev()
        .filter_map(|offset| end.checked_sub_days(Days::new(offset as u64)))
        .map(|date| {
            let stat = stats
                .binary_search_by_key(&date, |v| v.date)
                .ok()
                .map(|index| &stats[index]);
            (date, stat)
        })
        .collect()
}
