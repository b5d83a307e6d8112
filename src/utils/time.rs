use chrono::{Datelike, Days, Duration, NaiveDate};

const NOTE_DATE_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a date to a file stem in river.
pub fn date_to_note_name(date: NaiveDate) -> String {
    date.format(NOTE_DATE_FORMAT).to_string()
}

/// Parses a file stem produced by [date_to_note_name]. Only the canonical zero-padded spelling
/// is accepted, so `2024-1-1` and `2024-01-01` can't both name the same day.
pub fn note_name_to_date(name: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(name, NOTE_DATE_FORMAT).ok()?;
    (date_to_note_name(date) == name).then_some(date)
}

/// Most recent Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday();
    date - Days::new(offset as u64)
}

pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

/// Returns true when `next` is exactly one calendar day after `previous`.
pub fn is_next_day(previous: NaiveDate, next: NaiveDate) -> bool {
    previous.succ_opt() == Some(next)
}

/// Compact duration such as `1h5m20s`, `3m0s` or `42s`.
pub fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!(
            "{}h{}m{}s",
            v.num_hours(),
            v.num_minutes() % 60,
            v.num_seconds() % 60
        )
    } else if v.num_minutes() > 0 {
        format!("{}m{}s", v.num_minutes() % 60, v.num_seconds() % 60)
    } else {
        format!("{}s", v.num_seconds() % 60)
    }
}
