use anyhow::Result;
use chrono::NaiveDate;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    select,
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::notes::repository::NoteRepository;

use super::SessionEvent;

/// Line mode editing surface. Every input line is appended to the note for `date` and reported
/// to the session as a keystroke followed by a save.
///
/// Returns the number of lines written once the input ends, `shutdown` is cancelled or the
/// session stops listening. A line is either fully appended and reported or not written at all.
/// Dropping `sender` on return is what tells the session the editor closed.
pub async fn forward_lines(
    input: impl AsyncBufRead + Unpin,
    repository: impl NoteRepository,
    date: NaiveDate,
    sender: mpsc::Sender<SessionEvent>,
    shutdown: CancellationToken,
) -> Result<u64> {
    let mut lines = input.lines();
    let mut written = 0;
    loop {
        let line = select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            debug!("Input ended after {written} lines");
            break;
        };

        if sender.send(SessionEvent::Keystroke).await.is_err() {
            debug!("Session closed, dropping input");
            break;
        }
        repository.append_line(date, &line).await?;
        written += 1;
        if sender.send(SessionEvent::Save).await.is_err() {
            break;
        }
    }
    Ok(written)
}
