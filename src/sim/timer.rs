//! Repeating tick-driven timers
//!
//! Scheduler timers (alien spawn, attack launch, respawn poll) are modeled as
//! repeating deferred actions. Each owner holds its timers as named fields so
//! one can be stopped or restarted without touching the others.

use serde::{Deserialize, Serialize};

/// A repeating timer advanced by tick delta time.
///
/// Fires every `period` seconds of accumulated time while running. A stopped
/// timer keeps its period but ignores `advance` until restarted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepeatTimer {
    period: f32,
    elapsed: f32,
    running: bool,
}

impl RepeatTimer {
    pub fn new(period: f32) -> Self {
        Self {
            period,
            elapsed: 0.0,
            running: true,
        }
    }

    /// Accumulate `dt` and return how many times the timer fired.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.running {
            return 0;
        }
        self.elapsed += dt;
        let mut fires = 0;
        while self.elapsed >= self.period {
            self.elapsed -= self.period;
            fires += 1;
        }
        fires
    }

    /// Stop firing without losing the configured period.
    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed = 0.0;
    }

    /// Start over from zero accumulated time.
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
