// SPDX-License-Identifier: MPL-2.0
//! Album navigation.
//!
//! The navigator owns the scanned [`MediaCollection`] and the position being
//! shown. Images are decoded and displayed here; video entries are handed to
//! the [`VideoController`].
//!
//! # Retry-skip
//!
//! A failing candidate (corrupt data, unsupported format, file outside the
//! size bounds, video that won't start) is skipped and the next one in the
//! direction of travel is tried, at most once per entry. A collection with
//! nothing playable ends in [`Error::NotFound`] instead of looping forever.
//!
//! # Pausing
//!
//! - [`PauseReason::UserInteraction`] only pauses the periodic trigger and
//!   clears itself once the idle timeout brings the slideshow back.
//! - [`PauseReason::ExternalDeviceHold`] stops the slideshow outright until
//!   [`AlbumNavigator::resume`] is called.
//!
//! # Locking
//!
//! Scans, cursor updates and the image decode path share one lock. Video
//! start and stop run outside it; the navigator never drives the image path
//! and the video path for the same entry at once.

use super::arena::DecodeArena;
use crate::application::port::{ImageDecoder, ImageProcessor, MediaEnumerator, Presenter};
use crate::config::{
    DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH, ENGINE_LOCK_TIMEOUT_MS, MAX_IMAGE_FILE_BYTES,
    MIN_IMAGE_FILE_BYTES, PROGRESS_INDEX_OFFSET,
};
use crate::domain::media::{
    DecodedImage, ImageFormat, ImageInfo, MediaCollection, MediaEntry, MediaKind, ScaleMode,
};
use crate::domain::playback::{DisplayMode, PauseReason, PlaybackState, VideoState};
use crate::error::{Error, Result};
use crate::slideshow::SlideshowTimer;
use crate::video_player::{SharedEngine, VideoController};
use parking_lot::Mutex;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Collaborators used by the image path.
pub struct AlbumCollaborators {
    pub enumerator: Arc<dyn MediaEnumerator>,
    pub decoder: Arc<dyn ImageDecoder>,
    pub processor: Arc<dyn ImageProcessor>,
    pub presenter: Arc<dyn Presenter>,
    pub engine: SharedEngine,
}

#[derive(Debug, Clone)]
pub struct AlbumConfig {
    pub media_dir: PathBuf,
    pub display: ImageInfo,
    /// Image files outside these bounds are skipped without decoding.
    pub min_file_bytes: u64,
    pub max_file_bytes: u64,
    pub engine_timeout: Duration,
}

impl AlbumConfig {
    pub fn new(media_dir: impl Into<PathBuf>) -> Self {
        Self {
            media_dir: media_dir.into(),
            display: ImageInfo::new(DEFAULT_DISPLAY_WIDTH, DEFAULT_DISPLAY_HEIGHT),
            min_file_bytes: MIN_IMAGE_FILE_BYTES,
            max_file_bytes: MAX_IMAGE_FILE_BYTES,
            engine_timeout: Duration::from_millis(ENGINE_LOCK_TIMEOUT_MS),
        }
    }
}

struct AlbumInner {
    collection: MediaCollection,
    arena: DecodeArena,
    state: PlaybackState,
    pause_reason: PauseReason,
    /// Keeps the displayed pixels alive while the presenter shows them.
    shown: Option<DecodedImage>,
}

pub struct AlbumNavigator {
    inner: Mutex<AlbumInner>,
    enumerator: Arc<dyn MediaEnumerator>,
    decoder: Arc<dyn ImageDecoder>,
    processor: Arc<dyn ImageProcessor>,
    presenter: Arc<dyn Presenter>,
    engine: SharedEngine,
    slideshow: SlideshowTimer,
    video: Arc<VideoController>,
    config: AlbumConfig,
}

impl std::fmt::Debug for AlbumNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("AlbumNavigator")
            .field("media_dir", &self.config.media_dir)
            .field("count", &inner.collection.len())
            .field("current_index", &inner.collection.current_index())
            .field("state", &inner.state)
            .field("pause_reason", &inner.pause_reason)
            .finish_non_exhaustive()
    }
}

impl AlbumNavigator {
    pub fn new(
        parts: AlbumCollaborators,
        slideshow: SlideshowTimer,
        video: Arc<VideoController>,
        config: AlbumConfig,
    ) -> Self {
        let arena_capacity = usize::try_from(config.max_file_bytes).unwrap_or(usize::MAX);
        Self {
            inner: Mutex::new(AlbumInner {
                collection: MediaCollection::new(),
                arena: DecodeArena::new(arena_capacity),
                state: PlaybackState::Idle,
                pause_reason: PauseReason::None,
                shown: None,
            }),
            enumerator: parts.enumerator,
            decoder: parts.decoder,
            processor: parts.processor,
            presenter: parts.presenter,
            engine: parts.engine,
            slideshow,
            video,
            config,
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Scans the media directory and shows the first playable entry.
    ///
    /// The slideshow starts unless that entry is a video.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the directory holds no media or nothing in it
    /// plays; scan errors are propagated.
    pub fn start(&self) -> Result<()> {
        let count = {
            let mut inner = self.inner.lock();
            let entries = self.enumerator.scan(&self.config.media_dir)?;
            inner.collection.replace(entries, 0);
            inner.collection.len()
        };
        if count == 0 {
            return Err(Error::NotFound(format!(
                "no media in {}",
                self.config.media_dir.display()
            )));
        }
        log::info!(
            "Album started: {count} entries in {}",
            self.config.media_dir.display()
        );

        self.load_with_retry(0, 1)?;
        if !self.video.state().is_active() && !self.pause_reason().is_active() {
            self.slideshow.start();
        }
        Ok(())
    }

    /// Rescans and keeps showing the same file when it still exists.
    ///
    /// The current entry is reloaded unless the album is paused. An album
    /// that was empty always loads its first entry.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the rescan comes back empty (the collection is
    /// cleared); scan and load errors are propagated.
    pub fn refresh(&self) -> Result<()> {
        let (index, was_empty) = {
            let mut inner = self.inner.lock();
            let previous = inner.collection.current().map(|e| e.name().to_owned());
            let was_empty = previous.is_none();
            let entries = self.enumerator.scan(&self.config.media_dir)?;
            if entries.is_empty() {
                inner.collection.clear();
                inner.shown = None;
                log::info!("Album refreshed: no media left");
                return Err(Error::NotFound(format!(
                    "no media in {}",
                    self.config.media_dir.display()
                )));
            }

            let index = previous
                .and_then(|name| entries.iter().position(|e| e.name() == name))
                .unwrap_or(0);
            inner.collection.replace(entries, index);
            log::info!(
                "Album refreshed: {} entries, current index {index}",
                inner.collection.len()
            );
            (inner.collection.current_index().unwrap_or(0), was_empty)
        };

        if was_empty || !self.is_paused() {
            self.load_with_retry(index, 1)?;
        }
        Ok(())
    }

    /// Moves to the following entry, wrapping, skipping entries that fail.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the album is empty or nothing plays.
    pub fn next(&self) -> Result<()> {
        self.step(1)
    }

    /// Moves to the preceding entry, wrapping, skipping entries that fail.
    ///
    /// # Errors
    ///
    /// Same as [`next`](Self::next).
    pub fn prev(&self) -> Result<()> {
        self.step(-1)
    }

    /// Jumps to `index`, skipping forward from there on failure.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `index` is out of range (the position is
    /// left unchanged), [`Error::NotFound`] if nothing plays.
    pub fn goto(&self, index: usize) -> Result<()> {
        let count = self.count();
        if index >= count {
            return Err(Error::InvalidArgument(format!(
                "index {index} out of range for {count} entries"
            )));
        }
        self.load_with_retry(index, 1)
    }

    fn step(&self, step: isize) -> Result<()> {
        let from = self
            .current_index()
            .ok_or_else(|| Error::NotFound("album is empty".into()))?;

        if self.video.state().is_active() {
            self.presenter.show_loading();
            self.presenter.switch_mode(DisplayMode::Image);
            if let Err(e) = self.video.stop() {
                log::warn!("Failed to stop video before navigating: {e}");
            }
        }

        let candidate = self
            .inner
            .lock()
            .collection
            .offset_from(from, step)
            .ok_or_else(|| Error::NotFound("album is empty".into()))?;
        let result = self.load_with_retry(candidate, step);
        if result.is_err() {
            self.presenter.hide_loading();
        }
        result
    }

    fn load_with_retry(&self, first: usize, step: isize) -> Result<()> {
        let count = self.count();
        if count == 0 {
            return Err(Error::NotFound("album is empty".into()));
        }

        let mut candidate = first;
        for _ in 0..count {
            match self.load(candidate) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    let name = self.entry(candidate).map(|e| e.name().to_owned());
                    log::warn!(
                        "Skipping {}: {e}",
                        name.as_deref().unwrap_or("<missing entry>")
                    );
                    candidate = self
                        .inner
                        .lock()
                        .collection
                        .offset_from(candidate, step)
                        .unwrap_or(0);
                }
            }
        }

        self.inner.lock().state = PlaybackState::Error;
        log::error!("No playable media after trying all {count} entries");
        Err(Error::NotFound(format!(
            "no playable media after {count} attempts"
        )))
    }

    fn load(&self, index: usize) -> Result<()> {
        let entry = self
            .entry(index)
            .ok_or_else(|| Error::InvalidArgument(format!("no entry at index {index}")))?;

        match entry.kind() {
            MediaKind::Image => self.show_image(index, &entry),
            MediaKind::Video => self.show_video(index, &entry),
            MediaKind::Unknown => Err(Error::Unsupported(format!(
                "unknown media type: {}",
                entry.name()
            ))),
        }
    }

    // =========================================================================
    // Image Path
    // =========================================================================

    fn show_image(&self, index: usize, entry: &MediaEntry) -> Result<()> {
        if self.video.state().is_active() {
            if let Err(e) = self.video.stop() {
                log::warn!("Failed to stop video before showing an image: {e}");
            }
        }
        self.presenter.switch_mode(DisplayMode::Image);
        self.validate_size(entry)?;

        self.presenter.show_loading();
        let result = self.display_image(index, entry);
        self.presenter.hide_loading();
        result
    }

    fn validate_size(&self, entry: &MediaEntry) -> Result<()> {
        let size = entry.size();
        if size < self.config.min_file_bytes {
            return Err(Error::InvalidArgument(format!(
                "{} is too small ({size} bytes)",
                entry.name()
            )));
        }
        if size > self.config.max_file_bytes {
            return Err(Error::InvalidArgument(format!(
                "{} is too large ({size} bytes)",
                entry.name()
            )));
        }
        Ok(())
    }

    fn display_image(&self, index: usize, entry: &MediaEntry) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.state = PlaybackState::LoadingImage;

        let shown = self
            .decode_for_display(&mut inner.arena, entry)
            .and_then(|image| {
                self.presenter.display_image(&image)?;
                Ok(image)
            });
        let image = match shown {
            Ok(image) => image,
            Err(e) => {
                inner.state = PlaybackState::Error;
                return Err(e);
            }
        };
        inner.shown = Some(image);

        // The slideshow may have been stopped for a video.
        if !self.slideshow.is_running() && !self.effective_reason(inner.pause_reason).is_active() {
            self.slideshow.start();
        }

        inner.collection.set_current_index(index)?;
        inner.state = PlaybackState::DisplayingImage;
        self.presenter
            .update_progress(index + PROGRESS_INDEX_OFFSET, inner.collection.len());
        log::debug!(
            "Image displayed: {} ({}/{})",
            entry.name(),
            index + PROGRESS_INDEX_OFFSET,
            inner.collection.len()
        );
        Ok(())
    }

    /// Reads, decodes and fits one image to the display.
    fn decode_for_display(
        &self,
        arena: &mut DecodeArena,
        entry: &MediaEntry,
    ) -> Result<DecodedImage> {
        let format = ImageFormat::from_path(entry.path())
            .ok_or_else(|| Error::Unsupported(format!("not an image: {}", entry.name())))?;

        let mut file = std::fs::File::open(entry.path())?;
        let len = usize::try_from(file.metadata()?.len())
            .map_err(|_| Error::ResourceExhausted(format!("{} is too large", entry.name())))?;
        let bytes = arena.alloc(len)?;
        file.read_exact(bytes)?;

        let _lease = self.engine.acquire(self.config.engine_timeout)?;
        let image = self.decoder.decode(bytes, format)?;

        let src = image.info();
        let display = self.config.display;
        if src.fits_within(display) {
            return Ok(image);
        }

        let mode = ScaleMode::for_display(src, display);
        let plan = self.processor.compute_plan(src, display, mode)?;
        log::debug!(
            "Fitting {}x{} with {mode:?} -> {}x{}",
            src.width,
            src.height,
            plan.target.width,
            plan.target.height
        );
        self.processor.apply(image, &plan)
    }

    // =========================================================================
    // Video Path
    // =========================================================================

    fn show_video(&self, index: usize, entry: &MediaEntry) -> Result<()> {
        self.inner.lock().state = PlaybackState::StartingVideo;

        // Back-to-back videos switch softly: no mode change, no overlay.
        if self.video.state().is_active() {
            return match self.video.switch_file(entry.path()) {
                Ok(()) => self.commit_video(index, entry),
                Err(e) => {
                    self.inner.lock().state = PlaybackState::Error;
                    Err(e)
                }
            };
        }

        self.presenter.show_loading();
        let result = match self.video.play(entry.path()) {
            Ok(()) => self.commit_video(index, entry),
            Err(e) => {
                self.presenter.switch_mode(DisplayMode::Image);
                self.inner.lock().state = PlaybackState::Error;
                Err(e)
            }
        };
        self.presenter.hide_loading();
        result
    }

    fn commit_video(&self, index: usize, entry: &MediaEntry) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.collection.set_current_index(index)?;
        inner.state = PlaybackState::PlayingVideo;
        inner.shown = None;
        self.presenter
            .update_progress(index + PROGRESS_INDEX_OFFSET, inner.collection.len());
        log::debug!(
            "Video started: {} ({}/{})",
            entry.name(),
            index + PROGRESS_INDEX_OFFSET,
            inner.collection.len()
        );
        Ok(())
    }

    // =========================================================================
    // Slideshow Control
    // =========================================================================

    pub fn set_interval(&self, interval: Duration) {
        self.slideshow.set_interval(interval);
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.slideshow.interval()
    }

    /// Holds the slideshow for `reason`.
    pub fn pause(&self, reason: PauseReason) {
        let mut inner = self.inner.lock();
        match reason {
            PauseReason::None => {}
            PauseReason::UserInteraction => {
                inner.pause_reason = reason;
                self.slideshow.pause();
                log::debug!("Album paused by user");
            }
            PauseReason::ExternalDeviceHold => {
                inner.pause_reason = reason;
                self.slideshow.stop();
                log::info!("Album paused for external device (slideshow stopped)");
            }
        }
    }

    /// Releases the current pause.
    ///
    /// An external-device hold restarts the slideshow unconditionally; any
    /// other reason only ends a manual pause that is still pending.
    pub fn resume(&self) {
        let mut inner = self.inner.lock();
        let reason = std::mem::take(&mut inner.pause_reason);
        if reason == PauseReason::ExternalDeviceHold {
            self.slideshow.start();
            log::info!("Album resumed after external device release");
        } else {
            self.slideshow.resume();
            log::debug!("Album resumed");
        }
    }

    /// Forgets the stored pause reason without touching the slideshow.
    pub fn clear_pause_reason(&self) {
        self.inner.lock().pause_reason = PauseReason::None;
    }

    /// True whenever the slideshow is stopped.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        !self.slideshow.is_running()
    }

    /// Current pause reason. A user pause reads as cleared once the idle
    /// timeout has resumed the slideshow.
    #[must_use]
    pub fn pause_reason(&self) -> PauseReason {
        let mut inner = self.inner.lock();
        let effective = self.effective_reason(inner.pause_reason);
        inner.pause_reason = effective;
        effective
    }

    fn effective_reason(&self, stored: PauseReason) -> PauseReason {
        if stored.auto_clears() && !self.slideshow.is_manually_paused() {
            PauseReason::None
        } else {
            stored
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.inner.lock().collection.current_index()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.lock().collection.len()
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<MediaEntry> {
        self.inner.lock().collection.current().cloned()
    }

    #[must_use]
    pub fn entry(&self, index: usize) -> Option<MediaEntry> {
        self.inner.lock().collection.get(index).cloned()
    }

    /// True when the entry under the cursor is a video.
    #[must_use]
    pub fn current_is_video(&self) -> bool {
        self.current_entry()
            .is_some_and(|entry| entry.kind().is_video())
    }

    /// What the frame is doing, folding in the video controller's state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        let stored = self.inner.lock().state;
        if !matches!(stored, PlaybackState::PlayingVideo | PlaybackState::PausedVideo) {
            return stored;
        }
        match self.video.state() {
            VideoState::Playing => PlaybackState::PlayingVideo,
            VideoState::Paused => PlaybackState::PausedVideo,
            VideoState::Error => PlaybackState::Error,
            VideoState::Stopped => PlaybackState::Idle,
        }
    }

    #[must_use]
    pub fn slideshow(&self) -> &SlideshowTimer {
        &self.slideshow
    }

    #[must_use]
    pub fn video(&self) -> &Arc<VideoController> {
        &self.video
    }

    #[must_use]
    pub fn presenter(&self) -> &Arc<dyn Presenter> {
        &self.presenter
    }
}
