use serde::{Deserialize, Serialize};

/// Smoothing parameters for the clock reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ClockConfig {
    /// A sample differing from the previous one by more than this is fresh.
    pub sample_epsilon_ms: f64,
    /// Weight of the stale raw sample when blending (0..=1).
    pub sample_weight: f64,
    /// A fresh sample this far behind the current time is logged as a seek.
    pub seek_threshold_ms: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            sample_epsilon_ms: 1.0,
            sample_weight: 0.3,
            seek_threshold_ms: 1000.0,
        }
    }
}

impl ClockConfig {
    pub fn validate(&mut self) {
        let d = Self::default();
        if !self.sample_epsilon_ms.is_finite() {
            self.sample_epsilon_ms = d.sample_epsilon_ms;
        }
        if !self.sample_weight.is_finite() {
            self.sample_weight = d.sample_weight;
        }
        if !self.seek_threshold_ms.is_finite() {
            self.seek_threshold_ms = d.seek_threshold_ms;
        }
        self.sample_epsilon_ms = self.sample_epsilon_ms.clamp(0.0, 100.0);
        self.sample_weight = self.sample_weight.clamp(0.0, 1.0);
        self.seek_threshold_ms = self.seek_threshold_ms.clamp(50.0, 60_000.0);
    }
}

/// Turns an intermittently updating video time into a smooth game time.
///
/// - No sample: advance by the wall-clock delta since the previous call.
/// - Fresh sample: snap the smoothing baseline to it.
/// - Stale sample: estimate `baseline + wall elapsed`, blend with the raw
///   sample, and make the blend the new baseline.
///
/// The returned time never decreases for non-decreasing wall time. A sample
/// behind the current time re-baselines the smoothing, but the output holds
/// until the video catches up. Non-finite or negative samples are discarded,
/// so the result is always finite.
#[derive(Debug, Clone)]
pub struct ClockReconciler {
    config: ClockConfig,
    current_ms: f64,
    last_sample_ms: Option<f64>,
    smoothed_ms: f64,
    /// Wall time at which `smoothed_ms` was last set.
    baseline_wall_ms: f64,
    last_wall_ms: Option<f64>,
    discarded_samples: u64,
}

impl ClockReconciler {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            current_ms: 0.0,
            last_sample_ms: None,
            smoothed_ms: 0.0,
            baseline_wall_ms: 0.0,
            last_wall_ms: None,
            discarded_samples: 0,
        }
    }

    /// Authoritative game time from the last `reconcile`.
    pub fn current_ms(&self) -> f64 {
        self.current_ms
    }

    /// Samples rejected as non-finite or negative.
    pub fn discarded_samples(&self) -> u64 {
        self.discarded_samples
    }

    /// Return to time 0 with no smoothing history.
    pub fn reset(&mut self) {
        let config = self.config.clone();
        *self = Self::new(config);
    }

    /// Re-baseline the wall clock without advancing game time. Used when
    /// play starts or resumes so the paused gap is not counted.
    pub fn resync(&mut self, wall_now_ms: f64) {
        if !wall_now_ms.is_finite() {
            return;
        }
        self.last_wall_ms = Some(wall_now_ms);
        self.baseline_wall_ms = wall_now_ms;
        self.smoothed_ms = self.current_ms;
    }

    /// Produce this frame's game time.
    pub fn reconcile(&mut self, external_sample_ms: Option<f64>, wall_now_ms: f64) -> f64 {
        let wall_now_ms = if wall_now_ms.is_finite() {
            wall_now_ms
        } else {
            self.last_wall_ms.unwrap_or(0.0)
        };
        let wall_delta = match self.last_wall_ms {
            Some(prev) => (wall_now_ms - prev).max(0.0),
            None => 0.0,
        };
        let wall_now_ms = self.last_wall_ms.map_or(wall_now_ms, |prev| prev.max(wall_now_ms));
        self.last_wall_ms = Some(wall_now_ms);

        let sample = match external_sample_ms {
            Some(s) if s.is_finite() && s >= 0.0 => Some(s),
            Some(s) => {
                self.discarded_samples += 1;
                log::warn!("discarding invalid video time sample: {s}");
                None
            }
            None => None,
        };

        let Some(sample) = sample else {
            self.current_ms += wall_delta;
            return self.current_ms;
        };

        let fresh = self
            .last_sample_ms
            .is_none_or(|last| (sample - last).abs() > self.config.sample_epsilon_ms);
        let candidate = if fresh {
            self.last_sample_ms = Some(sample);
            sample
        } else {
            let estimate = self.smoothed_ms + (wall_now_ms - self.baseline_wall_ms).max(0.0);
            let w = self.config.sample_weight;
            w * sample + (1.0 - w) * estimate
        };
        self.smoothed_ms = candidate;
        self.baseline_wall_ms = wall_now_ms;

        if candidate >= self.current_ms {
            self.current_ms = candidate;
        } else if fresh && self.current_ms - candidate > self.config.seek_threshold_ms {
            log::info!(
                "video time {:.0} ms is behind game time {:.0} ms, holding",
                candidate,
                self.current_ms
            );
        }
        self.current_ms
    }
}

impl Default for ClockReconciler {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}
