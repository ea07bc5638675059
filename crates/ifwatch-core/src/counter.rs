// ── Two-sample counter window ──

use chrono::{DateTime, Utc};

/// A two-sample window over one monotonic metric.
///
/// Holds the last two raw samples and derives the delta and per-second
/// rate between them. Owned exclusively by one [`Interface`](crate::Interface);
/// nothing else mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counter {
    last: i64,
    before: i64,
    last_at: Option<DateTime<Utc>>,
    before_at: Option<DateTime<Utc>>,
    diff: i64,
    rate: i64,
}

impl Counter {
    /// Record a new raw sample and re-derive `diff` and `rate`.
    ///
    /// A negative delta means the counter wrapped or the device reset;
    /// the delta is clamped to zero so the display undercounts one tick
    /// instead of spiking. A window shorter than one whole second (or the
    /// very first sample) yields a rate of zero; spikes shorter than a
    /// second are smoothed out, and division by zero cannot occur.
    pub fn update(&mut self, value: i64, at: DateTime<Utc>) {
        self.before = self.last;
        self.before_at = self.last_at;
        self.last = value;
        self.last_at = Some(at);

        self.diff = (self.last - self.before).max(0);

        let elapsed = match self.before_at {
            Some(before_at) => (at - before_at).num_seconds(),
            None => 0,
        };
        self.rate = if elapsed == 0 { 0 } else { self.diff / elapsed };
    }

    /// Most recent raw sample.
    pub fn last(&self) -> i64 {
        self.last
    }

    /// Delta between the two most recent samples (clamped to zero on wrap).
    pub fn diff(&self) -> i64 {
        self.diff
    }

    /// Units per second over the current window.
    pub fn rate(&self) -> i64 {
        self.rate
    }
}
