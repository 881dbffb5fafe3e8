use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub api: ApiConfig,
    pub playback: PlaybackConfig,
    pub surface: SurfaceConfig,
}

impl PlayerConfig {
    /// Reads a JSON configuration file. Missing sections and fields fall back
    /// to their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Where the meditation catalog and relative media references live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub meditations_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            meditations_path: "api/meditations/".to_string(),
        }
    }
}

/// Timing knobs for the playback scheduler and the host render loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub progress_interval_ms: u64,
    pub frame_interval_ms: u64,
    pub trigger_log_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: 100,
            frame_interval_ms: 16,
            trigger_log_capacity: 8,
        }
    }
}

/// Initial size of the render surface effects are attached to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 450.0,
        }
    }
}
