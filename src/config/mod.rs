//! Engine configuration: board size, animation budget, and game-rule limits.
//!
//! Loaded once by the binary from an optional RON file; everything falls back
//! to defaults so a missing or broken file never prevents a game from starting.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "vimaze.ron";

/// Where the active `MazeConfig` came from. The binary loads the config
/// before the log plugin exists, so the outcome is kept and reported at
/// `Startup`.
#[derive(Resource, Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// No file at this path.
    Defaults(PathBuf),
    File(PathBuf),
    /// The file existed but could not be used.
    Fallback(String),
}

/// System: report how the config was loaded.
pub fn log_config_source(source: Option<Res<ConfigSource>>) {
    match source.as_deref() {
        Some(ConfigSource::Defaults(path)) => {
            info!("[Config] {} not found, using defaults", path.display())
        }
        Some(ConfigSource::File(path)) => info!("[Config] Loaded {}", path.display()),
        Some(ConfigSource::Fallback(e)) => warn!("[Config] {}; falling back to defaults", e),
        None => debug!("[Config] Config inserted directly"),
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Requested grid columns; halved into logical blocks by the generator.
    pub cols: usize,
    /// Requested grid rows; halved into logical blocks by the generator.
    pub rows: usize,
    /// Wall-time budget for one animated counted move.
    pub animation_budget_ms: u32,
    pub frame_ms: u32,
    /// Keystroke efficiency (percent of optimal) above which a run is lost.
    pub efficiency_limit: u32,
    pub invalid_flash_secs: f32,
    pub trail_secs: f32,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            cols: 32,
            rows: 24,
            animation_budget_ms: 64,
            frame_ms: 16,
            efficiency_limit: 150,
            invalid_flash_secs: 0.18,
            trail_secs: 0.22,
        }
    }
}

impl MazeConfig {
    pub fn from_ron(text: &str) -> Result<Self, String> {
        let config: MazeConfig =
            ron::from_str(text).map_err(|e| format!("Config parse failed: {}", e))?;
        Ok(config.sanitized())
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
        Self::from_ron(&text)
    }

    /// Loads `path`, or returns defaults if that fails. The returned
    /// `ConfigSource` says which happened.
    pub fn load_or_default(path: &Path) -> (Self, ConfigSource) {
        if !path.exists() {
            return (Self::default(), ConfigSource::Defaults(path.to_path_buf()));
        }
        match Self::load(path) {
            Ok(config) => (config, ConfigSource::File(path.to_path_buf())),
            Err(e) => (Self::default(), ConfigSource::Fallback(e)),
        }
    }

    /// Clamps values the engine cannot work with.
    pub fn sanitized(mut self) -> Self {
        self.cols = self.cols.max(2);
        self.rows = self.rows.max(2);
        self.frame_ms = self.frame_ms.max(1);
        self.animation_budget_ms = self.animation_budget_ms.max(1);
        self.efficiency_limit = self.efficiency_limit.max(100);
        self.invalid_flash_secs = self.invalid_flash_secs.max(0.0);
        self.trail_secs = self.trail_secs.max(0.0);
        self
    }
}
