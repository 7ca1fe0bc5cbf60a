// SPDX-License-Identifier: MPL-2.0
//! This module handles the frame's configuration, including loading and saving
//! user preferences to a `settings.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use slideframe::config::{self, Config};
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Modify a setting
//! config.slideshow.interval_ms = 10_000;
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::domain::volume::{SlideInterval, Volume};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "slideframe";
const FALLBACK_MEDIA_DIR: &str = "photos";

/// Order in which scanned entries are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Case-insensitive file name.
    #[default]
    Name,
    /// Oldest modification first.
    Modified,
    /// Smallest file first.
    Size,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideshowSettings {
    pub interval_ms: u64,
    pub idle_timeout_ms: u64,
}

impl Default for SlideshowSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_SLIDESHOW_INTERVAL_MS,
            idle_timeout_ms: DEFAULT_IDLE_RESUME_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub width: u32,
    pub height: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_DISPLAY_WIDTH,
            height: DEFAULT_DISPLAY_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub volume: u8,
    pub completion_margin_ms: u64,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            completion_margin_ms: DEFAULT_COMPLETION_MARGIN_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub sort_order: SortOrder,
    pub max_files: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            sort_order: SortOrder::default(),
            max_files: MAX_MEDIA_FILES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the photos and videos. Falls back to the user's
    /// pictures directory.
    pub media_dir: Option<PathBuf>,
    pub slideshow: SlideshowSettings,
    pub display: DisplaySettings,
    pub video: VideoSettings,
    pub scan: ScanSettings,
}

impl Config {
    /// Resolved media directory.
    #[must_use]
    pub fn media_dir(&self) -> PathBuf {
        self.media_dir
            .clone()
            .or_else(dirs::picture_dir)
            .unwrap_or_else(|| PathBuf::from(FALLBACK_MEDIA_DIR))
    }

    /// Slideshow period, clamped to the selectable range.
    #[must_use]
    pub fn slide_interval(&self) -> SlideInterval {
        SlideInterval::new(self.slideshow.interval_ms)
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.slideshow.idle_timeout_ms.max(1))
    }

    #[must_use]
    pub fn completion_margin(&self) -> Duration {
        Duration::from_millis(self.video.completion_margin_ms)
    }

    #[must_use]
    pub fn volume(&self) -> Volume {
        Volume::new(self.video.volume)
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Loads a config file. A document that fails to parse yields defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            log::warn!("Ignoring invalid config {}: {err}", path.display());
            Ok(Config::default())
        }
    }
}

/// Writes a config file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem write fails.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
