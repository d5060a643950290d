use serde::{Deserialize, Serialize};

use crate::judge::ScoreChange;

/// Hits within this many ms of the target count as exact.
pub const EXACT_THRESHOLD_MS: f64 = 1.0;

/// Cumulative FAST/SLOW statistics over successful hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingStats {
    pub fast_count: u32,
    pub exact_count: u32,
    pub slow_count: u32,
    /// Sum of signed deltas, for the mean offset.
    total_delta_ms: f64,
}

impl TimingStats {
    /// Record the timing of a judgement; non-hits are ignored.
    pub fn record(&mut self, change: &ScoreChange) {
        let ScoreChange::Hit { delta_ms, .. } = *change else {
            return;
        };
        if delta_ms < -EXACT_THRESHOLD_MS {
            self.fast_count += 1;
        } else if delta_ms > EXACT_THRESHOLD_MS {
            self.slow_count += 1;
        } else {
            self.exact_count += 1;
        }
        self.total_delta_ms += delta_ms;
    }

    pub fn count(&self) -> u32 {
        self.fast_count + self.exact_count + self.slow_count
    }

    /// Mean signed offset of recorded hits (ms), 0 when empty.
    pub fn mean_offset_ms(&self) -> f64 {
        match self.count() {
            0 => 0.0,
            n => self.total_delta_ms / f64::from(n),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
