use std::{fs, path::Path};

use anyhow::Context;
use glam::Vec2;
use serde::Deserialize;

/// Client-side tunables. A JSON file only needs the fields it overrides.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Radius N of the board at match start.
    pub radius: i32,
    /// Per-axis hex size in world units.
    pub cell_size: Vec2,
    /// Screen position of hex (0,0) before panning.
    pub origin: Vec2,
    /// World units per second.
    pub unit_speed: f32,
    pub camera_speed: f32,
    /// Screen zoom; camera panning is divided by it.
    pub pixel_ratio: f32,
    /// Fixed simulation ticks per second.
    pub tick_rate: u32,
    /// Longest frame the loop will catch up on, in seconds.
    pub max_frame: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            radius: 4,
            cell_size: Vec2::new(100., 50.),
            origin: Vec2::ZERO,
            unit_speed: 160.,
            camera_speed: 1000.,
            pixel_ratio: 1.,
            tick_rate: 60,
            max_frame: 0.25,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"radius": 6, "unitSpeed": 80}"#).unwrap();
        assert_eq!(config.radius, 6);
        assert_eq!(config.unit_speed, 80.);
        assert_eq!(config.cell_size, Vec2::new(100., 50.));
        assert_eq!(config.tick_rate, 60);
    }

    #[test]
    fn test_vectors_as_arrays() {
        let config: GameConfig = serde_json::from_str(r#"{"cellSize": [64, 32]}"#).unwrap();
        assert_eq!(config.cell_size, Vec2::new(64., 32.));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = GameConfig::load(Path::new("/nonexistent/game.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/game.json"));
    }
}
