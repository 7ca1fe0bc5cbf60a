// SPDX-License-Identifier: MPL-2.0
//! Presentation port.
//!
//! Gesture recognition and compositing live behind this trait; the playback
//! services only push content and overlay state into it.

use crate::domain::media::{DecodedImage, VideoFrame};
use crate::domain::playback::DisplayMode;
use crate::domain::volume::Volume;
use crate::error::Result;
use std::time::Duration;

pub trait Presenter: Send + Sync {
    /// Shows a still image.
    ///
    /// # Errors
    ///
    /// Returns an error if the display rejects the image.
    fn display_image(&self, image: &DecodedImage) -> Result<()>;

    /// Shows one decoded video frame. Called on the extraction thread while
    /// the frame lock is held, so implementations must not block.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be shown; the pipeline logs it
    /// and continues.
    fn display_video_frame(&self, frame: &VideoFrame<'_>) -> Result<()>;

    fn show_loading(&self);

    fn hide_loading(&self);

    /// `current` is 1-based.
    fn update_progress(&self, current: usize, total: usize);

    fn switch_mode(&self, mode: DisplayMode);

    /// Opens the settings panel preselecting `interval`.
    fn show_settings(&self, interval: Duration);

    fn hide_settings(&self);

    /// Interval currently selected in the settings panel.
    fn selected_interval(&self) -> Duration;

    /// Flashes the volume indicator.
    fn show_volume(&self, _volume: Volume) {}
}
