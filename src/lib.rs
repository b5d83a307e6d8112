//! Daily journaling with streaks and writing statistics.
//! Notes are plain markdown files, one per day, and every statistic is recomputed from them on
//! demand, so the notes directory is the only source of truth.
//!

pub mod analytics;
pub mod cli;
pub mod config;
pub mod notes;
pub mod session;
pub mod utils;
