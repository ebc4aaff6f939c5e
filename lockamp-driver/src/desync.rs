use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::{Duration, Instant},
};

/// Counts detected data loss events.
///
/// Only changes of the counter carry meaning: a reader compares the value
/// against the one it saw last and resets its timestamp basis on change.
#[derive(Debug, Default)]
pub struct DesyncCounter {
    count: AtomicU32,
}

impl DesyncCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Records a loss event.
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Current value.
    #[must_use]
    pub fn load(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Default window of [`RateLimit`].
pub const RATELIMIT_INTERVAL: Duration = Duration::from_secs(5);
/// Default burst of [`RateLimit`].
pub const RATELIMIT_BURST: u32 = 10;

/// Lets at most `burst` events through per `interval`.
///
/// When a new window starts the number of suppressed events of the
/// previous one is logged.
#[derive(Debug)]
pub struct RateLimit {
    interval: Duration,
    burst: u32,
    begin: Option<Instant>,
    printed: u32,
    missed: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::new(RATELIMIT_INTERVAL, RATELIMIT_BURST)
    }
}

impl RateLimit {
    /// Creates a rate limit.
    #[must_use]
    pub const fn new(interval: Duration, burst: u32) -> Self {
        Self {
            interval,
            burst,
            begin: None,
            printed: 0,
            missed: 0,
        }
    }

    /// Returns whether the event may be reported.
    pub fn allow(&mut self) -> bool {
        self.allow_at(Instant::now())
    }

    fn allow_at(&mut self, now: Instant) -> bool {
        match self.begin {
            Some(begin) if now.duration_since(begin) < self.interval => {}
            _ => {
                if self.missed > 0 {
                    tracing::warn!("{} warnings suppressed", self.missed);
                }
                self.begin = Some(now);
                self.printed = 0;
                self.missed = 0;
            }
        }
        if self.printed < self.burst {
            self.printed += 1;
            true
        } else {
            self.missed += 1;
            false
        }
    }

    /// Number of events suppressed in the current window.
    #[must_use]
    pub const fn missed(&self) -> u32 {
        self.missed
    }
}
