// ==============================================================================
// config.rs — RACE + SERVER CONFIGURATION
// ------------------------------------------------------------------------------
// Everything tunable without touching the simulation code. Loaded from an
// optional JSON file; any missing field keeps its default.
// ==============================================================================

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RacerError;

pub const CONFIG_ENV: &str = "RACER_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// WebSocket listen address for display clients
    pub bind_addr: String,
    pub total_laps: u32,
    pub ai_cars: usize,
    /// Fixed seed for AI generation + jitter. `None` draws one from the OS.
    pub seed: Option<u64>,
    pub frame_interval_ms: u64,
    pub input_interval_ms: u64,
    pub screen: ScreenConfig,
    /// Number of road bands projected into the screen
    pub draw_distance: usize,
    pub lanes: u32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:9001".to_string(),
            total_laps: 3,
            ai_cars: 4,
            seed: None,
            frame_interval_ms: 16,
            input_interval_ms: 16,
            screen: ScreenConfig::default(),
            draw_distance: 100,
            lanes: 3,
        }
    }
}

impl RaceConfig {
    pub fn from_json(path: &Path, text: &str) -> Result<Self, RacerError> {
        let config: RaceConfig =
            serde_json::from_str(text).map_err(|source| RacerError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from `$RACER_CONFIG`, or fall back to defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self, RacerError> {
        let path = path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        match path {
            Some(path) => {
                let text = std::fs::read_to_string(&path)?;
                Self::from_json(&path, &text)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), RacerError> {
        if self.total_laps == 0 {
            return Err(RacerError::InvalidConfig("total_laps must be at least 1".into()));
        }
        if self.frame_interval_ms == 0 || self.input_interval_ms == 0 {
            return Err(RacerError::InvalidConfig("tick intervals must be non-zero".into()));
        }
        if self.draw_distance == 0 {
            return Err(RacerError::InvalidConfig("draw_distance must be non-zero".into()));
        }
        if !(self.screen.width > 0.0 && self.screen.height > 0.0) {
            return Err(RacerError::InvalidConfig(format!(
                "screen must have a positive size, got {}x{}",
                self.screen.width, self.screen.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RaceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_laps, 3);
        assert_eq!(config.ai_cars, 4);
        assert_eq!(config.draw_distance, 100);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            RaceConfig::from_json(Path::new("race.json"), r#"{"total_laps": 5, "seed": 7}"#)
                .unwrap();
        assert_eq!(config.total_laps, 5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.bind_addr, "0.0.0.0:9001");
        assert_eq!(config.screen, ScreenConfig::default());
    }

    #[test]
    fn zero_laps_rejected() {
        let err = RaceConfig::from_json(Path::new("race.json"), r#"{"total_laps": 0}"#)
            .unwrap_err();
        assert!(matches!(err, RacerError::InvalidConfig(_)));
    }

    #[test]
    fn malformed_json_reports_path() {
        let err = RaceConfig::from_json(Path::new("broken.json"), "{ nope").unwrap_err();
        match err {
            RacerError::Config { path, .. } => assert_eq!(path, PathBuf::from("broken.json")),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
