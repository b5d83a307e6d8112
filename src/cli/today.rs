use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::{
    analytics::content_filter::filter_content,
    config::RiverConfig,
    notes::{
        repository::{FsNoteRepository, NoteRepository},
        template::{daily_template, parse_prompt_list},
    },
    utils::clock::Clock,
};

#[derive(Debug, PartialEq, Eq)]
pub struct TodayNote {
    pub path: PathBuf,
    pub created: bool,
    pub ghosts: Vec<String>,
}

pub async fn process_today_command(config: &RiverConfig, clock: &dyn Clock) -> Result<()> {
    let repository = FsNoteRepository::from_config(config);
    let today = create_today_note(&repository, clock).await?;

    if today.created {
        println!("Created {}", today.path.display());
    } else {
        println!("{}", today.path.display());
    }
    for ghost in today.ghosts {
        println!("  {ghost}");
    }
    Ok(())
}

/// Template for a new note on `date`. Personalized prompts win over the built-in rotation when
/// the prompt file has any.
pub async fn template_for(repository: &impl NoteRepository, date: NaiveDate) -> String {
    let personalized = repository
        .read_prompt_file()
        .await
        .map(|v| parse_prompt_list(&v))
        .unwrap_or_default();
    daily_template(date, &personalized)
}

/// Makes sure today's note exists. An existing note is never touched.
pub async fn create_today_note(
    repository: &impl NoteRepository,
    clock: &dyn Clock,
) -> Result<TodayNote> {
    let date = clock.time().date_naive();
    let template = template_for(repository, date).await;
    let created = repository.create_note_if_missing(date, &template).await?;
    if created {
        info!("Created note for {date}");
    }

    let ghosts = repository
        .read_note(date)
        .await?
        .map(|note| filter_content(&note.text).ghosts)
        .unwrap_or_default();

    Ok(TodayNote {
        path: repository.note_path(date),
        created,
        ghosts,
    })
}
