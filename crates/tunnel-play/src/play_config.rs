use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tunnel_rule::GameConfig;
use tunnel_timing::ClockConfig;

pub const MAX_FPS_LIMIT: u32 = 1000;

/// Everything a play session is configured with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PlayConfig {
    pub game: GameConfig,
    pub clock: ClockConfig,
    /// Frame cap; 0 = uncapped.
    pub max_fps: u32,
}

impl PlayConfig {
    pub fn validate(&mut self) {
        self.game.validate();
        self.clock.validate();
        self.max_fps = self.max_fps.min(MAX_FPS_LIMIT);
    }

    /// Minimum wall time between processed frames, if capped.
    pub fn frame_interval_ms(&self) -> Option<f64> {
        (self.max_fps > 0).then(|| 1000.0 / f64::from(self.max_fps))
    }

    /// Read config from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading play config {}", path.display()))?;
        let mut config: PlayConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing play config {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing play config {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_uncapped() {
        let c = PlayConfig::default();
        assert_eq!(c.max_fps, 0);
        assert_eq!(c.frame_interval_ms(), None);
    }

    #[test]
    fn test_frame_interval() {
        let c = PlayConfig {
            max_fps: 50,
            ..PlayConfig::default()
        };
        assert_eq!(c.frame_interval_ms(), Some(20.0));
    }

    #[test]
    fn test_validate_clamps_nested() {
        let mut c = PlayConfig {
            max_fps: 100_000,
            ..PlayConfig::default()
        };
        c.game.max_health = -3;
        c.clock.sample_weight = -1.0;
        c.validate();
        assert_eq!(c.max_fps, MAX_FPS_LIMIT);
        assert_eq!(c.game.max_health, 1);
        assert_eq!(c.clock.sample_weight, 0.0);
    }

    #[test]
    fn test_nested_partial_json() {
        let c: PlayConfig =
            serde_json::from_str(r#"{"maxFps":60,"game":{"missHealthPenalty":20}}"#).unwrap();
        assert_eq!(c.max_fps, 60);
        assert_eq!(c.game.miss_health_penalty, 20);
        assert_eq!(c.game.tap_hit_window_ms, 150.0);
        assert_eq!(c.clock, ClockConfig::default());
    }

    #[test]
    fn test_read_write_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("play.json");
        let c = PlayConfig {
            max_fps: 144,
            ..PlayConfig::default()
        };
        c.write(&path).unwrap();
        assert_eq!(PlayConfig::read(&path).unwrap(), c);
    }

    #[test]
    fn test_read_invalid_json_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = PlayConfig::read(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing play config"));
    }
}
