//! Survival timer
//!
//! Accumulates wall-clock deltas between ticks. The tick scheduler does not
//! guarantee fixed intervals, so elapsed time is measured, never counted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    /// Milliseconds survived this session
    elapsed_ms: f64,
    /// Host timestamp of the previous tick (ms)
    last_tick_ms: f64,
}

impl SimClock {
    pub fn new(now_ms: f64) -> Self {
        Self {
            elapsed_ms: 0.0,
            last_tick_ms: now_ms,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Measure time since the previous tick and add it to the timer.
    /// A host clock that steps backwards contributes nothing.
    pub fn advance(&mut self, now_ms: f64) -> f64 {
        let delta = (now_ms - self.last_tick_ms).max(0.0);
        self.elapsed_ms += delta;
        self.last_tick_ms = now_ms;
        delta
    }

    /// Forget the previous tick time so a pause is not credited
    pub fn resync(&mut self, now_ms: f64) {
        self.last_tick_ms = now_ms;
    }

    /// Zero the timer for a new session
    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }
}
