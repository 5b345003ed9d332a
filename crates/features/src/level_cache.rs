//! Time-boxed cache of the mean volume per book level.

use dom_core::{BookSnapshot, TimestampMs};

/// Value reported before the first successful computation.
pub const FALLBACK_AVERAGE: f64 = 1.0;

/// Average level volume, recomputed at most once per TTL.
#[derive(Debug, Clone)]
pub struct AverageVolumeCache {
    ttl_ms: i64,
    value: Option<f64>,
    computed_at: Option<TimestampMs>,
}

impl AverageVolumeCache {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            ttl_ms,
            value: None,
            computed_at: None,
        }
    }

    /// True when more than the TTL has elapsed since the last computation.
    pub fn is_stale(&self, now_ms: TimestampMs) -> bool {
        match self.computed_at {
            Some(ts) => now_ms - ts > self.ttl_ms,
            None => true,
        }
    }

    /// Return the cached average, recomputing it from `fetch` when stale.
    ///
    /// `fetch` is only called when the cache is stale. A failed fetch, an
    /// empty book or a zero average keeps the previous value and leaves the
    /// cache stale so the next call retries.
    pub fn get_or_refresh<F>(&mut self, now_ms: TimestampMs, fetch: F) -> f64
    where
        F: FnOnce() -> Option<BookSnapshot>,
    {
        if self.is_stale(now_ms) {
            let average = fetch()
                .and_then(|snapshot| snapshot.average_volume())
                .filter(|avg| *avg > 0.0);
            if let Some(avg) = average {
                self.value = Some(avg);
                self.computed_at = Some(now_ms);
            }
        }
        self.value()
    }

    /// Cached average, or the fallback if nothing has been computed.
    pub fn value(&self) -> f64 {
        self.value.unwrap_or(FALLBACK_AVERAGE)
    }

    /// Time of the last successful computation.
    pub fn computed_at(&self) -> Option<TimestampMs> {
        self.computed_at
    }

    /// Clear all data.
    pub fn clear(&mut self) {
        self.value = None;
        self.computed_at = None;
    }
}
