use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tunnel_model::AccuracyTier;

pub const WINDOW_MIN_MS: f64 = 1.0;
pub const WINDOW_MAX_MS: f64 = 1000.0;
pub const BUFFER_MAX_MS: f64 = 2000.0;
pub const LEAD_TIME_MIN_MS: f64 = 100.0;
pub const LEAD_TIME_MAX_MS: f64 = 10000.0;
pub const HEALTH_MAX: i32 = 10000;

/// Tuning parameters for one play session. Loaded once, never mutated
/// during play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct GameConfig {
    /// Symmetric tap hit window around `note.time` (ms).
    pub tap_hit_window_ms: f64,
    /// Extra grace after the tap window before auto-fail (ms).
    pub tap_failure_buffer_ms: f64,
    /// Symmetric hold press window around `note.time` (ms).
    pub hold_hit_window_ms: f64,
    /// Unpressed hold auto-fails this long after `note.time` (ms).
    pub hold_miss_timeout_ms: f64,
    /// Allowed distance between release and `press + duration` (ms).
    pub hold_release_window_ms: f64,
    /// Pressed hold auto-fails this long after its expected release (ms).
    pub hold_release_offset_ms: f64,
    /// How far before the hit window an approaching note still takes a
    /// press (judged too early).
    pub early_press_tolerance_ms: f64,
    /// How long before `note.time` a note becomes visible (ms).
    pub lead_time_ms: f64,
    pub accuracy_perfect_ms: f64,
    pub accuracy_great_ms: f64,
    pub perfect_points: u32,
    pub great_points: u32,
    pub normal_points: u32,
    pub max_health: i32,
    /// Health lost per failure.
    pub miss_health_penalty: i32,
    /// Health gained per successful hit.
    pub hit_health_gain: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tap_hit_window_ms: 150.0,
            tap_failure_buffer_ms: 100.0,
            hold_hit_window_ms: 150.0,
            hold_miss_timeout_ms: 250.0,
            hold_release_window_ms: 150.0,
            hold_release_offset_ms: 150.0,
            early_press_tolerance_ms: 100.0,
            lead_time_ms: 1500.0,
            accuracy_perfect_ms: 50.0,
            accuracy_great_ms: 100.0,
            perfect_points: 300,
            great_points: 200,
            normal_points: 100,
            max_health: 100,
            miss_health_penalty: 10,
            hit_health_gain: 0,
        }
    }
}

/// Clamp a window value, replacing non-finite input with `fallback`.
fn clamp_ms(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

impl GameConfig {
    /// Clamp every field into range and restore window ordering.
    pub fn validate(&mut self) {
        let d = Self::default();

        self.tap_hit_window_ms = clamp_ms(
            self.tap_hit_window_ms,
            WINDOW_MIN_MS,
            WINDOW_MAX_MS,
            d.tap_hit_window_ms,
        );
        self.tap_failure_buffer_ms = clamp_ms(
            self.tap_failure_buffer_ms,
            0.0,
            BUFFER_MAX_MS,
            d.tap_failure_buffer_ms,
        );
        self.hold_hit_window_ms = clamp_ms(
            self.hold_hit_window_ms,
            WINDOW_MIN_MS,
            WINDOW_MAX_MS,
            d.hold_hit_window_ms,
        );
        self.hold_miss_timeout_ms = clamp_ms(
            self.hold_miss_timeout_ms,
            self.hold_hit_window_ms,
            BUFFER_MAX_MS,
            d.hold_miss_timeout_ms,
        )
        .max(self.hold_hit_window_ms);
        self.hold_release_window_ms = clamp_ms(
            self.hold_release_window_ms,
            WINDOW_MIN_MS,
            WINDOW_MAX_MS,
            d.hold_release_window_ms,
        );
        self.hold_release_offset_ms = clamp_ms(
            self.hold_release_offset_ms,
            self.hold_release_window_ms,
            BUFFER_MAX_MS,
            d.hold_release_offset_ms,
        )
        .max(self.hold_release_window_ms);
        self.early_press_tolerance_ms = clamp_ms(
            self.early_press_tolerance_ms,
            0.0,
            BUFFER_MAX_MS,
            d.early_press_tolerance_ms,
        );
        self.lead_time_ms = clamp_ms(
            self.lead_time_ms,
            LEAD_TIME_MIN_MS,
            LEAD_TIME_MAX_MS,
            d.lead_time_ms,
        );

        // perfect <= great <= tap window
        self.accuracy_great_ms = clamp_ms(
            self.accuracy_great_ms,
            0.0,
            self.tap_hit_window_ms,
            d.accuracy_great_ms.min(self.tap_hit_window_ms),
        );
        self.accuracy_perfect_ms = clamp_ms(
            self.accuracy_perfect_ms,
            0.0,
            self.accuracy_great_ms,
            d.accuracy_perfect_ms.min(self.accuracy_great_ms),
        );

        self.max_health = self.max_health.clamp(1, HEALTH_MAX);
        self.miss_health_penalty = self.miss_health_penalty.clamp(0, self.max_health);
        self.hit_health_gain = self.hit_health_gain.clamp(0, self.max_health);
    }

    /// Accuracy tier for a signed timing delta.
    pub fn tier_for(&self, delta_ms: f64) -> AccuracyTier {
        let abs = delta_ms.abs();
        if abs <= self.accuracy_perfect_ms {
            AccuracyTier::Perfect
        } else if abs <= self.accuracy_great_ms {
            AccuracyTier::Great
        } else {
            AccuracyTier::Normal
        }
    }

    pub fn points_for(&self, tier: AccuracyTier) -> u32 {
        match tier {
            AccuracyTier::Perfect => self.perfect_points,
            AccuracyTier::Great => self.great_points,
            AccuracyTier::Normal => self.normal_points,
        }
    }

    /// Read config from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading game config {}", path.display()))?;
        let mut config: GameConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing game config {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
