use std::sync::Arc;

use anyhow::Result;
use tokio::{io::BufReader, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    config::RiverConfig,
    notes::repository::{FsNoteRepository, NoteRepository},
    session::{input::forward_lines, shutdown::detect_shutdown, WritingSession},
    utils::{clock::Clock, time::format_duration},
};

use super::today::template_for;

const EVENT_BUFFER: usize = 64;

/// Command to process `write`. Opens today's note and a writing session, then feeds stdin into
/// the note line by line until input ends or ctrl-c.
pub async fn process_write_command(config: &RiverConfig, clock: Box<dyn Clock>) -> Result<()> {
    let repository = Arc::new(FsNoteRepository::from_config(config));
    let date = clock.time().date_naive();
    let template = template_for(&repository, date).await;
    repository.create_note_if_missing(date, &template).await?;

    let session = WritingSession::start(repository.clone(), clock, config).await;
    println!(
        "Writing to {}. Every line is saved as you go, end input or press ctrl-c to finish.",
        repository.note_path(date).display()
    );

    let shutdown = CancellationToken::new();
    let (sender, receiver) = mpsc::channel(EVENT_BUFFER);
    let input = BufReader::new(tokio::io::stdin());

    let (_, lines, stats) = tokio::join!(
        detect_shutdown(shutdown.clone()),
        forward_lines(input, repository.clone(), date, sender, shutdown.clone()),
        async {
            // Only the end of input stops the session, so a line appended during ctrl-c is
            // still counted by the final flush.
            let stats = session.run(receiver, CancellationToken::new()).await;
            // Session is over, stop waiting for input and signals.
            shutdown.cancel();
            stats
        }
    );

    let stats = stats?;
    let lines = lines?;
    info!("Write session finished after {lines} lines");
    println!(
        "Saved. {} words and {} of typing today.",
        stats.word_count,
        format_duration(stats.typing_time())
    );
    Ok(())
}
