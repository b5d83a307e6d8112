//! Writing statistics derived from the note corpus.
//!
//! Everything here is recomputed from disk on each call: [daily] reads the corpus once,
//! [streak] and [period] are pure functions over the resulting [daily::DailyStat] list, and
//! [report] combines them for display or for an insight generator.

pub mod content_filter;
pub mod daily;
pub mod period;
pub mod report;
pub mod streak;

/// Serializes [chrono::Duration] as whole seconds.
pub(crate) mod duration_ser {
    use chrono::Duration;
    use serde::Serializer;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(duration.num_seconds())
    }
}
