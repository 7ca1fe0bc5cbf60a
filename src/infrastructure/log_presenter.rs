// SPDX-License-Identifier: MPL-2.0
//! Headless presenter.
//!
//! Logs what a screen would show. Used by the binary when no display is
//! attached and handy when tracing playback on a development host.

use crate::application::port::Presenter;
use crate::domain::media::{DecodedImage, VideoFrame};
use crate::domain::playback::DisplayMode;
use crate::domain::volume::Volume;
use crate::error::Result;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Only every n-th video frame is logged.
const FRAME_LOG_EVERY: u64 = 100;

#[derive(Debug)]
pub struct LogPresenter {
    /// Interval the settings dialog reports back.
    selected: Mutex<Duration>,
    frames: AtomicU64,
}

impl LogPresenter {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            selected: Mutex::new(interval),
            frames: AtomicU64::new(0),
        }
    }

    /// Sets what [`Presenter::selected_interval`] returns next.
    pub fn select_interval(&self, interval: Duration) {
        *self.selected.lock() = interval;
    }

    /// Video frames received so far.
    #[must_use]
    pub fn frames_presented(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

impl Presenter for LogPresenter {
    fn display_image(&self, image: &DecodedImage) -> Result<()> {
        log::info!("[display] image {}x{}", image.width(), image.height());
        Ok(())
    }

    fn display_video_frame(&self, frame: &VideoFrame<'_>) -> Result<()> {
        let count = self.frames.fetch_add(1, Ordering::Relaxed) + 1;
        if count % FRAME_LOG_EVERY == 1 {
            log::debug!(
                "[display] video frame #{} {}x{}",
                frame.index,
                frame.width,
                frame.height
            );
        }
        Ok(())
    }

    fn show_loading(&self) {
        log::trace!("[display] loading");
    }

    fn hide_loading(&self) {
        log::trace!("[display] loading done");
    }

    fn update_progress(&self, current: usize, total: usize) {
        log::info!("[display] {current}/{total}");
    }

    fn switch_mode(&self, mode: DisplayMode) {
        log::debug!("[display] mode {mode:?}");
    }

    fn show_settings(&self, interval: Duration) {
        log::info!("[display] settings open (interval {interval:?})");
    }

    fn hide_settings(&self) {
        log::info!("[display] settings closed");
    }

    fn selected_interval(&self) -> Duration {
        *self.selected.lock()
    }

    fn show_volume(&self, volume: Volume) {
        log::info!("[display] volume {}", volume.value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_selected_interval() {
        let presenter = LogPresenter::new(Duration::from_secs(5));
        assert_eq!(presenter.selected_interval(), Duration::from_secs(5));
        presenter.select_interval(Duration::from_secs(15));
        assert_eq!(presenter.selected_interval(), Duration::from_secs(15));
    }

    #[test]
    fn counts_video_frames() {
        let presenter = LogPresenter::new(Duration::from_secs(5));
        let data = [0u8; 16];
        for index in 0..3 {
            let frame = VideoFrame {
                data: &data,
                width: 4,
                height: 2,
                index,
                slot: 0,
            };
            presenter.display_video_frame(&frame).expect("frame");
        }
        assert_eq!(presenter.frames_presented(), 3);
    }
}
