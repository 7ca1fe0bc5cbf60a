// SPDX-License-Identifier: MPL-2.0
//! External-device hold.
//!
//! While a host has exclusive access to the media volume the slideshow is
//! stopped and a playing video is paused. Releasing the hold rescans the
//! directory and restores whatever was showing.

use super::DeviceEvent;
use crate::album::AlbumNavigator;
use crate::domain::playback::{DisplayMode, PauseReason, VideoState};
use std::sync::Arc;

/// What was on screen when the hold began.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HeldState {
    was_video: bool,
    video_was_playing: bool,
}

#[derive(Debug)]
pub struct DeviceCoordinator {
    album: Arc<AlbumNavigator>,
    held: Option<HeldState>,
}

impl DeviceCoordinator {
    pub fn new(album: Arc<AlbumNavigator>) -> Self {
        Self { album, held: None }
    }

    /// True between a connect and the matching disconnect.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }

    pub fn handle(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Connected => self.on_connected(),
            DeviceEvent::Disconnected => self.on_disconnected(),
        }
    }

    fn on_connected(&mut self) {
        if self.held.is_some() {
            log::debug!("Device already connected, ignoring");
            return;
        }

        let video = self.album.video();
        let mut held = HeldState {
            was_video: self.album.current_is_video(),
            video_was_playing: false,
        };

        if video.state() == VideoState::Playing {
            match video.pause() {
                Ok(()) => held.video_was_playing = true,
                Err(e) => log::warn!("Failed to pause video for device hold: {e}"),
            }
        }
        if held.was_video {
            self.album.presenter().switch_mode(DisplayMode::Image);
        }

        self.album.pause(PauseReason::ExternalDeviceHold);
        self.held = Some(held);
        log::info!(
            "External device connected (video: {}, playing: {})",
            held.was_video,
            held.video_was_playing
        );
    }

    fn on_disconnected(&mut self) {
        let Some(held) = self.held.take() else {
            log::debug!("Device disconnected without an active hold, ignoring");
            return;
        };
        log::info!("External device disconnected");

        if let Err(e) = self.album.refresh() {
            log::warn!("Rescan after device release failed: {e}");
        }

        // Navigation during the hold may have left the video, so go by what
        // is current now rather than what was showing at connect time.
        if !self.video_on_screen() {
            self.album.resume();
            return;
        }

        // The timer stays stopped while the video owns the screen. Clearing
        // first lets a fallback `next` onto an image restart the slideshow.
        self.album.clear_pause_reason();
        self.album.presenter().switch_mode(DisplayMode::Video);
        if held.video_was_playing {
            self.resume_video();
        } else {
            self.restore_paused_video();
        }
    }

    fn video_on_screen(&self) -> bool {
        let video = self.album.video();
        self.album.current_is_video() && (video.state().is_active() || video.has_error())
    }

    fn resume_video(&self) {
        let video = self.album.video();
        let resumed = if video.has_error() {
            video.restart_current()
        } else {
            video.resume().or_else(|e| {
                log::warn!("Resume after device release failed: {e}, restarting");
                video.restart_current()
            })
        };
        if let Err(e) = resumed {
            log::warn!("Video restart failed: {e}, advancing");
            self.advance();
        }
    }

    fn restore_paused_video(&self) {
        let video = self.album.video();
        if !video.has_error() {
            return;
        }
        match video.restart_current().and_then(|()| video.pause()) {
            Ok(()) => log::debug!("Restored paused video after device release"),
            Err(e) => {
                log::warn!("Video restore failed: {e}, advancing");
                self.advance();
            }
        }
    }

    fn advance(&self) {
        if let Err(e) = self.album.next() {
            log::error!("Failed to advance after device release: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{write_image, write_video, TestAlbum};

    #[tokio::test(start_paused = true)]
    async fn hold_on_image_stops_and_restarts_slideshow() {
        let h = TestAlbum::new(TestAlbum::images(2));
        h.album.start().expect("start");
        let mut device = DeviceCoordinator::new(Arc::clone(&h.album));

        device.handle(DeviceEvent::Connected);
        assert!(device.is_held());
        assert!(h.album.is_paused());
        assert_eq!(h.album.pause_reason(), PauseReason::ExternalDeviceHold);

        device.handle(DeviceEvent::Disconnected);
        assert!(!device.is_held());
        assert!(!h.album.is_paused());
        assert_eq!(h.album.pause_reason(), PauseReason::None);
    }

    #[tokio::test(start_paused = true)]
    async fn hold_on_playing_video_pauses_and_resumes_it() {
        let h = TestAlbum::new(|dir| vec![write_video(dir, "clip.mp4"), write_image(dir, "a.jpg", 64, 64)]);
        h.album.start().expect("start");
        let video = Arc::clone(h.album.video());
        assert_eq!(video.state(), VideoState::Playing);
        let mut device = DeviceCoordinator::new(Arc::clone(&h.album));

        device.handle(DeviceEvent::Connected);
        assert_eq!(video.state(), VideoState::Paused);
        assert_eq!(h.presenter.last_mode(), Some(DisplayMode::Image));

        device.handle(DeviceEvent::Disconnected);
        assert_eq!(video.state(), VideoState::Playing);
        assert_eq!(h.presenter.last_mode(), Some(DisplayMode::Video));
        assert_eq!(h.album.pause_reason(), PauseReason::None);
        assert!(h.album.is_paused(), "slideshow stays stopped during video");
        video.stop().expect("stop");
    }

    #[tokio::test(start_paused = true)]
    async fn swiping_off_a_video_during_hold_resumes_slideshow_on_release() {
        let h = TestAlbum::new(|dir| vec![write_video(dir, "clip.mp4"), write_image(dir, "a.jpg", 64, 64)]);
        h.album.start().expect("start");
        let mut device = DeviceCoordinator::new(Arc::clone(&h.album));

        device.handle(DeviceEvent::Connected);
        h.album.next().expect("next");
        assert_eq!(h.album.current_index(), Some(1));
        assert_eq!(h.album.video().state(), VideoState::Stopped);
        assert!(h.album.is_paused(), "hold keeps the slideshow stopped");

        device.handle(DeviceEvent::Disconnected);
        assert_eq!(h.album.current_index(), Some(1));
        assert_eq!(h.album.video().state(), VideoState::Stopped);
        assert_eq!(h.presenter.last_mode(), Some(DisplayMode::Image));
        assert_eq!(h.album.pause_reason(), PauseReason::None);
        assert!(!h.album.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn paused_video_stays_paused_after_release() {
        let h = TestAlbum::new(|dir| vec![write_video(dir, "clip.mp4")]);
        h.album.start().expect("start");
        let video = Arc::clone(h.album.video());
        video.pause().expect("pause");
        let mut device = DeviceCoordinator::new(Arc::clone(&h.album));

        device.handle(DeviceEvent::Connected);
        device.handle(DeviceEvent::Disconnected);
        assert_eq!(video.state(), VideoState::Paused);
        video.stop().expect("stop");
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_connect_and_stray_disconnect_are_ignored() {
        let h = TestAlbum::new(TestAlbum::images(2));
        h.album.start().expect("start");
        let mut device = DeviceCoordinator::new(Arc::clone(&h.album));

        device.handle(DeviceEvent::Disconnected);
        assert!(!h.album.is_paused());

        device.handle(DeviceEvent::Connected);
        device.handle(DeviceEvent::Connected);
        device.handle(DeviceEvent::Disconnected);
        assert!(!device.is_held());
        assert!(!h.album.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn release_rescans_directory() {
        let h = TestAlbum::new(TestAlbum::images(2));
        h.album.start().expect("start");
        let mut device = DeviceCoordinator::new(Arc::clone(&h.album));

        device.handle(DeviceEvent::Connected);
        let dir = h.dir.path().to_path_buf();
        h.enumerator.set(crate::test_utils::entries_for(&[
            dir.join("img0.jpg"),
            dir.join("img1.jpg"),
            write_image(&dir, "uploaded.jpg", 64, 64),
        ]));
        device.handle(DeviceEvent::Disconnected);

        assert_eq!(h.album.count(), 3);
        assert_eq!(h.album.current_index(), Some(0));
    }
}
