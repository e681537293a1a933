//! Application settings
//!
//! Loaded from a JSON file in the platform config directory and written
//! back when changed. A missing or malformed file falls back to defaults
//! with a logged warning; settings never block startup.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::filters::FilterParams;

const SETTINGS_FILE: &str = "camera-filters.json";

/// Snapshot output format, selected by file extension on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SaveFormat::Png => "PNG (lossless)",
            SaveFormat::Jpeg => "JPEG",
        }
    }
}

/// Persisted application preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Camera device index used by the start button
    pub camera_index: u32,
    /// Redraw/capture rate
    pub target_fps: u32,
    /// Pretrained face detection model (rustface format); `None` leaves
    /// the face filter unavailable
    pub face_model_path: Option<PathBuf>,
    /// TTF used for the on-frame object count; `None` skips the overlay
    pub font_path: Option<PathBuf>,
    /// Directory snapshots are written into
    pub save_dir: PathBuf,
    /// Snapshot format (chooses the file extension)
    pub save_format: SaveFormat,
    /// Default filter parameters applied at startup
    pub filter_params: FilterParams,
}

impl Default for Settings {
    fn default() -> Self {
        let save_dir = dirs::picture_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            camera_index: 0,
            target_fps: 30,
            face_model_path: None,
            font_path: None,
            save_dir,
            save_format: SaveFormat::default(),
            filter_params: FilterParams::default(),
        }
    }
}

impl Settings {
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SETTINGS_FILE))
    }

    /// Load settings, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::settings_path() else {
            log::warn!("No config directory; using default settings");
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Malformed settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Write settings back to disk. Failures are logged, never fatal.
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else {
            return;
        };
        let serialized = match serde_json::to_string_pretty(self) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Failed to serialize settings: {}", e);
                return;
            }
        };
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(e) = fs::write(&path, serialized) {
            log::warn!("Failed to write settings to {}: {}", path.display(), e);
        }
    }

    /// Path for the next snapshot, unique per capture sequence number.
    pub fn snapshot_path(&self, frame_number: u64) -> PathBuf {
        self.save_dir.join(format!(
            "camera-filters-{:06}.{}",
            frame_number,
            self.save_format.extension()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_json() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.camera_index, settings.camera_index);
        assert_eq!(back.target_fps, settings.target_fps);
        assert_eq!(back.save_format, settings.save_format);
        assert_eq!(back.filter_params, settings.filter_params);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let back: Settings = serde_json::from_str(r#"{"camera_index": 2}"#).unwrap();
        assert_eq!(back.camera_index, 2);
        assert_eq!(back.target_fps, Settings::default().target_fps);
    }

    #[test]
    fn snapshot_path_uses_configured_format() {
        let mut settings = Settings::default();
        settings.save_dir = PathBuf::from("/tmp/shots");
        settings.save_format = SaveFormat::Jpeg;
        let path = settings.snapshot_path(42);
        assert_eq!(path, PathBuf::from("/tmp/shots/camera-filters-000042.jpg"));
    }
}
