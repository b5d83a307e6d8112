use std::{
    future::{self, Future},
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use futures::{StreamExt, TryStreamExt};
use tokio::{
    fs::{self, File},
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tokio_stream::wrappers::ReadDirStream;
use tracing::{debug, warn};

use crate::{
    config::RiverConfig,
    utils::time::{date_to_note_name, note_name_to_date},
};

use super::entities::{Note, NoteFile, SidecarStats};

const NOTE_EXTENSION: &str = "md";
const SIDECAR_PREFIX: &str = ".stats-";
const SIDECAR_EXTENSION: &str = "toml";
const PROMPTS_FILE: &str = ".prompts";

/// Interface for abstracting storage of notes and their sidecars.
pub trait NoteRepository {
    /// Lists every note file whose name is a canonical date, sorted by date. Files with other
    /// names are skipped. Fails only when the directory itself can't be listed.
    fn list_notes(&self) -> impl Future<Output = Result<Vec<NoteFile>>>;

    /// Reads the note for a day. `None` means there is no note for that day.
    fn read_note(&self, date: NaiveDate) -> impl Future<Output = Result<Option<Note>>>;

    /// Reads the sidecar for a day. Missing or malformed sidecars yield `None`.
    fn read_sidecar(&self, date: NaiveDate) -> impl Future<Output = Option<SidecarStats>>;

    fn write_sidecar(
        &self,
        date: NaiveDate,
        stats: SidecarStats,
    ) -> impl Future<Output = Result<()>>;

    /// Creates the note for a day with `template` as its content. Returns false if the note
    /// already existed, in which case it is left untouched.
    fn create_note_if_missing(
        &self,
        date: NaiveDate,
        template: &str,
    ) -> impl Future<Output = Result<bool>>;

    /// Appends a line of prose to the note for a day, creating the note if needed.
    fn append_line(&self, date: NaiveDate, line: &str) -> impl Future<Output = Result<()>>;

    /// Raw content of the personalized prompt list, if the user has one.
    fn read_prompt_file(&self) -> impl Future<Output = Option<String>>;

    fn note_path(&self, date: NaiveDate) -> PathBuf;
}

impl<T: Deref> NoteRepository for T
where
    T::Target: NoteRepository,
{
    fn list_notes(&self) -> impl Future<Output = Result<Vec<NoteFile>>> {
        self.deref().list_notes()
    }

    fn read_note(&self, date: NaiveDate) -> impl Future<Output = Result<Option<Note>>> {
        self.deref().read_note(date)
    }

    fn read_sidecar(&self, date: NaiveDate) -> impl Future<Output = Option<SidecarStats>> {
        self.deref().read_sidecar(date)
    }

    fn write_sidecar(
        &self,
        date: NaiveDate,
        stats: SidecarStats,
    ) -> impl Future<Output = Result<()>> {
        self.deref().write_sidecar(date, stats)
    }

    fn create_note_if_missing(
        &self,
        date: NaiveDate,
        template: &str,
    ) -> impl Future<Output = Result<bool>> {
        self.deref().create_note_if_missing(date, template)
    }

    fn append_line(&self, date: NaiveDate, line: &str) -> impl Future<Output = Result<()>> {
        self.deref().append_line(date, line)
    }

    fn read_prompt_file(&self) -> impl Future<Output = Option<String>> {
        self.deref().read_prompt_file()
    }

    fn note_path(&self, date: NaiveDate) -> PathBuf {
        self.deref().note_path(date)
    }
}

/// The main realization of [NoteRepository].
///
/// Constructing it has no side effects, so read-only commands never create the notes
/// directory. Writers create it on demand.
pub struct FsNoteRepository {
    notes_dir: PathBuf,
}

impl FsNoteRepository {
    pub fn new(notes_dir: PathBuf) -> Self {
        Self { notes_dir }
    }

    pub fn from_config(config: &RiverConfig) -> Self {
        Self::new(config.notes_dir.clone())
    }

    fn sidecar_path(&self, date: NaiveDate) -> PathBuf {
        self.notes_dir.join(format!(
            "{SIDECAR_PREFIX}{}.{SIDECAR_EXTENSION}",
            date_to_note_name(date)
        ))
    }

    async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.notes_dir)
            .await
            .with_context(|| format!("Failed to create notes directory {:?}", self.notes_dir))
    }
}

/// Returns a [NoteFile] when `path` names a dated note.
fn note_file(path: PathBuf) -> Option<NoteFile> {
    if path.extension()? != NOTE_EXTENSION {
        return None;
    }
    let date = note_name_to_date(path.file_stem()?.to_str()?)?;
    Some(NoteFile { date, path })
}

async fn read_locked(path: &Path) -> std::result::Result<String, std::io::Error> {
    let mut file = File::open(path).await?;
    file.lock_shared()?;
    let mut content = String::new();
    let result = file.read_to_string(&mut content).await;
    file.unlock_async().await?;
    result.map(|_| content)
}

impl NoteRepository for FsNoteRepository {
    async fn list_notes(&self) -> Result<Vec<NoteFile>> {
        let entries = match fs::read_dir(&self.notes_dir).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Notes directory {:?} doesn't exist yet", self.notes_dir);
                return Ok(vec![]);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to list notes in {:?}", self.notes_dir))
            }
        };

        let mut notes = ReadDirStream::new(entries)
            .map(|entry| {
                entry.with_context(|| format!("Failed to list notes in {:?}", self.notes_dir))
            })
            .try_filter_map(|entry| future::ready(Ok(note_file(entry.path()))))
            .try_collect::<Vec<_>>()
            .await?;

        notes.sort_by_key(|v| v.date);
        Ok(notes)
    }

    async fn read_note(&self, date: NaiveDate) -> Result<Option<Note>> {
        let path = self.note_path(date);
        match read_locked(&path).await {
            Ok(text) => Ok(Some(Note { date, text })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read note {path:?}")),
        }
    }

    async fn read_sidecar(&self, date: NaiveDate) -> Option<SidecarStats> {
        let path = self.sidecar_path(date);
        let text = match read_locked(&path).await {
            Ok(v) => v,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Failed to read sidecar {path:?}: {e}");
                }
                return None;
            }
        };
        let stats = toml::from_str::<SidecarStats>(&text)
            .inspect_err(|e| warn!("Ignoring malformed sidecar {path:?}: {e}"))
            .ok()?;
        if !stats.is_plausible() {
            warn!("Ignoring sidecar {path:?} with {}s of typing", stats.typing_seconds);
            return None;
        }
        Some(stats)
    }

    async fn write_sidecar(&self, date: NaiveDate, stats: SidecarStats) -> Result<()> {
        self.ensure_dir().await?;
        let path = self.sidecar_path(date);
        let content = toml::to_string(&stats)?;

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open sidecar {path:?}"))?;

        // Truncate only once the lock is held so readers never observe an empty file.
        file.lock_exclusive()?;
        let result = async {
            file.set_len(0).await?;
            file.rewind().await?;
            file.write_all(content.as_bytes()).await?;
            file.flush().await
        }
        .await;
        file.unlock_async().await?;
        result.with_context(|| format!("Failed to write sidecar {path:?}"))?;

        debug!("Saved {stats:?} into {path:?}");
        Ok(())
    }

    async fn create_note_if_missing(&self, date: NaiveDate, template: &str) -> Result<bool> {
        self.ensure_dir().await?;
        let path = self.note_path(date);
        let mut file = match File::options().write(true).create_new(true).open(&path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e).with_context(|| format!("Failed to create note {path:?}")),
        };
        file.write_all(template.as_bytes()).await?;
        file.flush().await?;
        debug!("Created note {path:?}");
        Ok(true)
    }

    async fn append_line(&self, date: NaiveDate, line: &str) -> Result<()> {
        self.ensure_dir().await?;
        let path = self.note_path(date);

        let mut file = File::options()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open note {path:?}"))?;

        file.lock_exclusive()?;
        let result = async {
            let mut existing = String::new();
            file.read_to_string(&mut existing).await?;
            let mut buffer = String::with_capacity(line.len() + 2);
            if !existing.is_empty() && !existing.ends_with('\n') {
                buffer.push('\n');
            }
            buffer.push_str(line);
            buffer.push('\n');
            file.write_all(buffer.as_bytes()).await?;
            file.flush().await
        }
        .await;
        file.unlock_async().await?;
        result.with_context(|| format!("Failed to append to note {path:?}"))
    }

    async fn read_prompt_file(&self) -> Option<String> {
        fs::read_to_string(self.notes_dir.join(PROMPTS_FILE))
            .await
            .ok()
    }

    fn note_path(&self, date: NaiveDate) -> PathBuf {
        self.notes_dir
            .join(format!("{}.{NOTE_EXTENSION}", date_to_note_name(date)))
    }
}
