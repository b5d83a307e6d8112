//! The note corpus is organized through [repository::FsNoteRepository].
//! The basic idea is:
//!  - There is one directory holding every note.
//!  - Each local calendar day owns at most one note, `YYYY-MM-DD.md`.
//!  - Typing statistics for a day live next to the note in a hidden sidecar,
//!    `.stats-YYYY-MM-DD.toml`, written only by a live writing session.

pub mod entities;
pub mod repository;
pub mod template;
