use chrono::{DateTime, Duration, Local};

/// Accrues typing time for one writing session.
///
/// Time is credited on ticks, and only while the last keystroke is less than `idle_cutoff` old.
/// The accumulated value never decreases.
#[derive(Debug, Clone)]
pub struct ActivityClock {
    accumulated: Duration,
    last_activity: DateTime<Local>,
    last_tick: DateTime<Local>,
    idle_cutoff: Duration,
}

impl ActivityClock {
    /// `seed` is the typing time already recorded for the day. Opening a session counts as
    /// activity.
    pub fn new(seed: Duration, started_at: DateTime<Local>, idle_cutoff: Duration) -> Self {
        Self {
            accumulated: seed.max(Duration::zero()),
            last_activity: started_at,
            last_tick: started_at,
            idle_cutoff,
        }
    }

    /// Registers input at `now`. Input after an idle stretch starts a new measurement, the
    /// stretch itself is never credited, however late the next tick arrives.
    pub fn keystroke(&mut self, now: DateTime<Local>) {
        if self.is_idle(now) {
            self.last_tick = self.last_tick.max(now);
        }
        self.last_activity = self.last_activity.max(now);
    }

    pub fn is_idle(&self, now: DateTime<Local>) -> bool {
        now - self.last_activity >= self.idle_cutoff
    }

    /// Credits the whole seconds elapsed since the previous credited tick, unless the writer is
    /// idle. Returns the credited time.
    pub fn tick(&mut self, now: DateTime<Local>) -> Duration {
        let elapsed = now - self.last_tick;
        if elapsed < Duration::zero() || self.is_idle(now) {
            // Wall clock moved backwards, or nobody is typing. Either way restart measuring
            // from here.
            self.last_tick = now;
            return Duration::zero();
        }

        let credited = Duration::seconds(elapsed.num_seconds());
        // Sub-second leftovers carry over to the next tick.
        self.last_tick += credited;
        self.accumulated += credited;
        credited
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }
}
