//! Single-shot gap timer
//!
//! The timer only keeps time. Delivering the expiry to the sequencer
//! (`PlaybackSequencer::on_gap_elapsed`) is the job of whoever owns the
//! event loop.

use std::time::Duration;

/// Single-shot delay between playlist entries
pub trait GapTimer {
    /// Change the delay used by the next `start`
    ///
    /// A wait already in progress keeps its original deadline.
    fn set_interval(&mut self, interval: Duration);

    /// Configured delay
    fn interval(&self) -> Duration;

    /// Arm the timer, restarting it if already armed
    fn start(&mut self);

    /// Disarm the timer
    fn stop(&mut self);

    /// Whether the timer is armed and has not fired yet
    fn is_active(&self) -> bool;
}

/// Deterministic timer driven by virtual time
///
/// Time only moves when [`ManualGapTimer::advance`] is called, which makes
/// gap lengths exactly observable in tests.
#[derive(Debug, Clone, Default)]
pub struct ManualGapTimer {
    interval: Duration,
    now: Duration,
    deadline: Option<Duration>,
    starts: usize,
}

impl ManualGapTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    /// Move virtual time forward
    ///
    /// Returns `true` if the timer fired during this step. A fired timer is
    /// disarmed.
    pub fn advance(&mut self, by: Duration) -> bool {
        self.now += by;
        match self.deadline {
            Some(deadline) if self.now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Time left until the timer fires
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_sub(self.now))
    }

    /// Number of times the timer has been armed
    pub fn start_count(&self) -> usize {
        self.starts
    }
}

impl GapTimer for ManualGapTimer {
    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn start(&mut self) {
        self.starts += 1;
        self.deadline = Some(self.now + self.interval);
    }

    fn stop(&mut self) {
        self.deadline = None;
    }

    fn is_active(&self) -> bool {
        self.deadline.is_some()
    }
}
