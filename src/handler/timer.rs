//! Absence confirmation
//!
//! Screenshots are taken out of step with the game's rendering, so a
//! single frame without an overlay says little. [`ConfirmTimer`] only
//! reports an overlay as gone once it has stayed away for a full window.

use std::time::{Duration, Instant};

/// Debounce for "continuously absent for at least `limit`"
#[derive(Debug, Clone)]
pub struct ConfirmTimer {
    limit: Duration,
    started: Option<Instant>,
}

impl ConfirmTimer {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            started: None,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn is_started(&self) -> bool {
        self.started.is_some()
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        self.started = Some(now);
    }

    /// Restart the window from now
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.started = Some(now);
    }

    pub fn reached(&self) -> bool {
        self.reached_at(Instant::now())
    }

    /// Whether the full window has passed since the last start or reset
    pub fn reached_at(&self, now: Instant) -> bool {
        match self.started {
            Some(started) => now.saturating_duration_since(started) >= self.limit,
            None => false,
        }
    }

    /// Feed one sample of the watched condition
    pub fn tick(&mut self, present: bool) -> bool {
        self.tick_at(present, Instant::now())
    }

    /// Feed one sample taken at `now`; returns whether absence is confirmed
    pub fn tick_at(&mut self, present: bool, now: Instant) -> bool {
        if present {
            self.reset_at(now);
            return false;
        }
        if self.started.is_none() {
            self.start_at(now);
        }
        self.reached_at(now)
    }
}
