// SPDX-License-Identifier: MPL-2.0
//! Clamped value types for audio volume and slideshow period.

use crate::config::{
    DEFAULT_SLIDESHOW_INTERVAL_MS, DEFAULT_VOLUME, MAX_SLIDESHOW_INTERVAL_MS, MAX_VOLUME,
    MIN_SLIDESHOW_INTERVAL_MS, MIN_VOLUME, VOLUME_STEP,
};
use std::time::Duration;

// =============================================================================
// Volume
// =============================================================================

/// Audio volume in percent, guaranteed to be within 0–100.
///
/// # Example
///
/// ```
/// use slideframe::domain::volume::Volume;
///
/// let vol = Volume::new(40);
/// assert_eq!(vol.increase().value(), 50);
///
/// // Values outside range are clamped
/// assert_eq!(Volume::new(180).value(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Volume(u8);

impl Volume {
    /// Creates a new volume level, clamping to valid range.
    #[must_use]
    pub fn new(volume: u8) -> Self {
        Self(volume.clamp(MIN_VOLUME, MAX_VOLUME))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_muted(self) -> bool {
        self.0 == MIN_VOLUME
    }

    /// Increases volume by one step, clamping to maximum.
    #[must_use]
    pub fn increase(self) -> Self {
        Self::new(self.0.saturating_add(VOLUME_STEP))
    }

    /// Decreases volume by one step, clamping to minimum.
    #[must_use]
    pub fn decrease(self) -> Self {
        Self::new(self.0.saturating_sub(VOLUME_STEP))
    }

    #[must_use]
    pub fn is_max(self) -> bool {
        self.0 >= MAX_VOLUME
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(DEFAULT_VOLUME)
    }
}

// =============================================================================
// SlideInterval
// =============================================================================

/// Slideshow period selectable from settings, clamped to 2–60 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideInterval(u64);

impl SlideInterval {
    #[must_use]
    pub fn new(millis: u64) -> Self {
        Self(millis.clamp(MIN_SLIDESHOW_INTERVAL_MS, MAX_SLIDESHOW_INTERVAL_MS))
    }

    #[must_use]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for SlideInterval {
    fn default() -> Self {
        Self(DEFAULT_SLIDESHOW_INTERVAL_MS)
    }
}

impl From<SlideInterval> for Duration {
    fn from(value: SlideInterval) -> Self {
        value.as_duration()
    }
}
