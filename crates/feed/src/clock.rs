//! Wall-clock abstraction.

use chrono::Utc;
use dom_core::TimestampMs;

/// Source of the current time in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> TimestampMs;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> TimestampMs {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to. Used by replay and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now_ms: TimestampMs,
}

impl ManualClock {
    pub fn new(start_ms: TimestampMs) -> Self {
        Self { now_ms: start_ms }
    }

    /// Jump to an absolute time.
    pub fn set(&mut self, ts_ms: TimestampMs) {
        self.now_ms = ts_ms;
    }

    /// Move forward by `ms`.
    pub fn advance(&mut self, ms: i64) {
        self.now_ms += ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> TimestampMs {
        self.now_ms
    }
}
