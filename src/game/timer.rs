//! Simulated-time timers
//!
//! Timers advance by each tick's delta, so repeating callbacks (score, ramp,
//! hazard spawn, advice) interleave with ticks deterministically.

use std::time::Duration;

/// Longest simulated step a single tick may cover
pub const MAX_TICK: Duration = Duration::from_secs(1);

/// Repeating timer that can be stopped and restarted
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    elapsed: Duration,
    running: bool,
}

impl Interval {
    /// Create a stopped timer
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            elapsed: Duration::ZERO,
            running: false,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Start from zero; a restart never carries over partial progress
    pub fn start(&mut self) {
        self.elapsed = Duration::ZERO;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance by `dt` and return how many times the timer fired
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if !self.running || self.period.is_zero() {
            return 0;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        let mut fired = 0;
        while self.elapsed >= self.period {
            self.elapsed -= self.period;
            fired += 1;
        }
        fired
    }
}

/// One-shot timer; re-arming restarts the countdown
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    remaining: Option<Duration>,
}

impl Countdown {
    pub fn arm(&mut self, duration: Duration) {
        self.remaining = Some(duration);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    /// Advance by `dt`, returning true exactly once when it expires
    pub fn advance(&mut self, dt: Duration) -> bool {
        match self.remaining {
            Some(remaining) if dt >= remaining => {
                self.remaining = None;
                true
            }
            Some(remaining) => {
                self.remaining = Some(remaining - dt);
                false
            }
            None => false,
        }
    }
}

/// Convert a tick delta in seconds to a `Duration`.
///
/// Negative or NaN deltas count as zero; anything longer than [`MAX_TICK`]
/// (including infinity) is clamped to it.
pub fn tick_duration(dt: f32) -> Duration {
    if dt.is_nan() || dt <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(dt).map_or(MAX_TICK, |d| d.min(MAX_TICK))
}
