use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use activity_clock::ActivityClock;

use crate::{
    analytics::content_filter::note_word_count,
    config::RiverConfig,
    notes::{entities::SidecarStats, repository::NoteRepository},
    utils::clock::Clock,
};

pub mod activity_clock;
pub mod input;
pub mod shutdown;

/// Events produced by the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Keystroke,
    /// The note was saved, typing time should be persisted too.
    Save,
}

/// A live writing session for one day. Keystrokes, saves and clock ticks are all handled by
/// [WritingSession::run] on a single task, so the activity state has exactly one writer.
pub struct WritingSession<R: NoteRepository> {
    repository: R,
    date: NaiveDate,
    activity: ActivityClock,
    time_provider: Box<dyn Clock>,
    tick_interval: StdDuration,
}

impl<R: NoteRepository> WritingSession<R> {
    /// Opens a session for the current day. Typing time continues from the day's sidecar, or
    /// from zero when the sidecar is missing or unreadable.
    pub async fn start(repository: R, time_provider: Box<dyn Clock>, config: &RiverConfig) -> Self {
        let now = time_provider.time();
        let date = now.date_naive();
        let seed = repository
            .read_sidecar(date)
            .await
            .map(|v| v.typing_time())
            .unwrap_or_else(Duration::zero);
        info!("Starting session for {date} with {}s recorded", seed.num_seconds());

        Self {
            repository,
            date,
            activity: ActivityClock::new(seed, now, config.idle_cutoff),
            time_provider,
            tick_interval: config.tick_interval,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn typing_time(&self) -> Duration {
        self.activity.accumulated()
    }

    /// Persists accumulated typing time together with the current word count of the note.
    pub async fn flush(&self) -> Result<SidecarStats> {
        let words = self
            .repository
            .read_note(self.date)
            .await?
            .map(|note| note_word_count(&note.text))
            .unwrap_or(0);
        let stats = SidecarStats::new(self.activity.accumulated(), words);
        self.repository.write_sidecar(self.date, stats).await?;
        Ok(stats)
    }

    /// Executes the session event loop until the event channel closes or `shutdown` is
    /// cancelled, then flushes one last time.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<SessionEvent>,
        shutdown: CancellationToken,
    ) -> Result<SidecarStats> {
        let mut next_tick = self.time_provider.instant() + self.tick_interval;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Session cancelled");
                    break;
                }
                event = events.recv() => match event {
                    Some(SessionEvent::Keystroke) => {
                        self.activity.keystroke(self.time_provider.time());
                    }
                    Some(SessionEvent::Save) => {
                        match self.flush().await {
                            Ok(stats) => debug!("Saved {stats:?}"),
                            // A failed save shouldn't end the session, the next one may succeed.
                            Err(e) => error!("Failed to save session stats {e:?}"),
                        }
                    }
                    None => {
                        debug!("Event source closed");
                        break;
                    }
                },
                _ = self.time_provider.sleep_until(next_tick) => {
                    next_tick += self.tick_interval;
                    let credited = self.activity.tick(self.time_provider.time());
                    trace!("Tick credited {}s", credited.num_seconds());
                }
            }
        }

        events.close();
        let stats = self.flush().await?;
        info!("Session for {} ended with {stats:?}", self.date);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, time::Duration as StdDuration};

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Local, NaiveDate, TimeZone};
    use tempfile::tempdir;
    use tokio::{sync::mpsc, time::Instant};
    use tokio_util::sync::CancellationToken;

    use super::{SessionEvent, WritingSession};
    use crate::{
        config::RiverConfig,
        notes::{
            entities::SidecarStats,
            repository::{FsNoteRepository, NoteRepository},
        },
        utils::{clock::Clock, logging::TEST_LOGGING},
    };

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

    #[derive(Clone)]
    struct TestClock {
        start_time: DateTime<Local>,
        reference: Instant,
    }

    impl TestClock {
        fn new() -> Self {
            let naive = TEST_DATE.and_hms_opt(12, 0, 0).unwrap();
            Self {
                start_time: Local.from_local_datetime(&naive).earliest().unwrap(),
                reference: Instant::now(),
            }
        }
    }

    #[async_trait]
    impl Clock for TestClock {
        fn time(&self) -> DateTime<Local> {
            self.start_time + self.reference.elapsed()
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_accumulates_and_flushes_on_close() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let repository = FsNoteRepository::new(dir.path().to_owned());
        fs::write(repository.note_path(TEST_DATE), "<!-- prompt -->\n\nhello world")?;
        repository
            .write_sidecar(
                TEST_DATE,
                SidecarStats {
                    typing_seconds: 100,
                    word_count: 0,
                },
            )
            .await?;

        let config = RiverConfig::new(dir.path().to_owned());
        let session = WritingSession::start(&repository, Box::new(TestClock::new()), &config).await;
        assert_eq!(session.date(), TEST_DATE);
        assert_eq!(session.typing_time().num_seconds(), 100);

        let (sender, receiver) = mpsc::channel(10);
        let (result, _) = tokio::join!(
            session.run(receiver, CancellationToken::new()),
            async move {
                tokio::time::sleep(StdDuration::from_secs(10)).await;
                sender.send(SessionEvent::Keystroke).await.unwrap();
                // Writer goes idle for longer than the cutoff before closing the editor.
                tokio::time::sleep(StdDuration::from_secs(100)).await;
                drop(sender);
            }
        );

        // Active from opening until 60 seconds after the keystroke at 10s.
        let expected = SidecarStats {
            typing_seconds: 169,
            word_count: 2,
        };
        assert_eq!(result?, expected);
        assert_eq!(repository.read_sidecar(TEST_DATE).await, Some(expected));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_event_and_cancellation() -> Result<()> {
        let dir = tempdir()?;
        let repository = FsNoteRepository::new(dir.path().to_owned());
        fs::write(repository.note_path(TEST_DATE), "a b c")?;
        fs::write(dir.path().join(".stats-2024-01-05.toml"), "not toml at all")?;

        let config = RiverConfig::new(dir.path().to_owned());
        let session = WritingSession::start(&repository, Box::new(TestClock::new()), &config).await;
        assert_eq!(session.typing_time().num_seconds(), 0);

        let shutdown = CancellationToken::new();
        let (sender, receiver) = mpsc::channel(10);
        let (result, saved) = tokio::join!(session.run(receiver, shutdown.clone()), async {
            tokio::time::sleep(StdDuration::from_millis(5500)).await;
            sender.send(SessionEvent::Save).await.unwrap();
            tokio::time::sleep(StdDuration::from_millis(100)).await;
            let saved = repository.read_sidecar(TEST_DATE).await;
            tokio::time::sleep(StdDuration::from_secs(3)).await;
            shutdown.cancel();
            saved
        });

        assert_eq!(
            saved,
            Some(SidecarStats {
                typing_seconds: 5,
                word_count: 3,
            })
        );
        assert_eq!(result?.typing_seconds, 8);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_note_flushes_zero_words() -> Result<()> {
        let dir = tempdir()?;
        let repository = FsNoteRepository::new(dir.path().join("fresh"));
        let config = RiverConfig::new(dir.path().join("fresh"));
        let session = WritingSession::start(&repository, Box::new(TestClock::new()), &config).await;

        let stats = session.flush().await?;
        assert_eq!(stats, SidecarStats::default());
        assert_eq!(repository.read_sidecar(TEST_DATE).await, Some(stats));
        Ok(())
    }
}
