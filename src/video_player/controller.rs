// SPDX-License-Identifier: MPL-2.0
//! Video playback controller.
//!
//! Owns the [`ExtractionPipeline`] lifecycle for one video at a time and
//! detects the end of a video with a one-shot completion timer armed for the
//! container duration plus a small margin. There is no per-frame end-of-stream
//! signalling: when the timer fires, the completion callback runs and the
//! application moves on to the next entry.
//!
//! A paused video never completes: pausing suspends the completion timer and
//! resuming re-arms it with whatever time was left.

use super::engine::SharedEngine;
use super::pipeline::{ExtractionPipeline, FrameSink, PipelineConfig, PipelineStats};
use crate::application::port::{AudioSink, ContainerExtractor, Presenter};
use crate::config::{DEFAULT_COMPLETION_MARGIN_MS, RESTART_SETTLE_MS};
use crate::domain::media::{VideoFrame, VideoInfo};
use crate::domain::playback::{DisplayMode, VideoState};
use crate::domain::volume::Volume;
use crate::error::{Error, Result};
use crate::slideshow::SlideshowTimer;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Identifies the playback a completion timer was armed for.
///
/// A ticket goes stale as soon as the video is stopped, paused, switched or
/// seeked, so a completion that was queued before one of those is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionTicket(u64);

/// Called once when a playing video's completion timer expires.
pub type CompletionFn = Arc<dyn Fn(CompletionTicket) + Send + Sync>;

/// Collaborators the controller drives.
pub struct VideoCollaborators {
    pub extractor: Box<dyn ContainerExtractor>,
    pub engine: SharedEngine,
    pub presenter: Arc<dyn Presenter>,
    pub audio: Option<Arc<dyn AudioSink>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    /// Added to the container duration before completion fires.
    pub completion_margin: Duration,
    /// Pause between stop and play in [`VideoController::restart_current`].
    pub restart_settle: Duration,
    pub initial_volume: Volume,
    pub pipeline: PipelineConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            completion_margin: Duration::from_millis(DEFAULT_COMPLETION_MARGIN_MS),
            restart_settle: Duration::from_millis(RESTART_SETTLE_MS),
            initial_volume: Volume::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

struct CompletionTimer {
    task: JoinHandle<()>,
    deadline: Instant,
}

struct ControllerInner {
    state: VideoState,
    pipeline: ExtractionPipeline,
    path: Option<PathBuf>,
    info: Option<VideoInfo>,
    volume: Volume,
    completion: Option<CompletionTimer>,
    /// Time left on the completion timer while paused.
    suspended: Option<Duration>,
}

pub struct VideoController {
    inner: Mutex<ControllerInner>,
    presenter: Arc<dyn Presenter>,
    audio: Option<Arc<dyn AudioSink>>,
    slideshow: SlideshowTimer,
    runtime: Handle,
    on_complete: CompletionFn,
    config: ControllerConfig,
    /// Set by a failed pipeline call, cleared by `stop`, a fresh `play` or
    /// the next decoded frame.
    error_flag: Arc<AtomicBool>,
    /// Invalidates completion tasks that already woke up when cancelled.
    completion_generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for VideoController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("VideoController")
            .field("state", &inner.state)
            .field("path", &inner.path)
            .field("volume", &inner.volume)
            .field("has_error", &self.error_flag.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl VideoController {
    pub fn new(
        parts: VideoCollaborators,
        slideshow: SlideshowTimer,
        runtime: Handle,
        on_complete: CompletionFn,
        config: ControllerConfig,
    ) -> Self {
        let error_flag = Arc::new(AtomicBool::new(false));
        let sink = frame_sink(Arc::clone(&parts.presenter), Arc::clone(&error_flag));
        let pipeline = ExtractionPipeline::new(parts.extractor, parts.engine, sink, config.pipeline);

        Self {
            inner: Mutex::new(ControllerInner {
                state: VideoState::Stopped,
                pipeline,
                path: None,
                info: None,
                volume: config.initial_volume,
                completion: None,
                suspended: None,
            }),
            presenter: parts.presenter,
            audio: parts.audio,
            slideshow,
            runtime,
            on_complete,
            config,
            error_flag,
            completion_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts playing `path` from the beginning.
    ///
    /// Switches the presenter to video mode and stops the slideshow first.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] unless stopped or in error; otherwise the
    /// pipeline's error, after which the controller is in
    /// [`VideoState::Error`].
    pub fn play(&self, path: &Path) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.state.can_play() {
            return Err(Error::InvalidState(format!(
                "play requested while {:?}",
                inner.state
            )));
        }

        inner.path = Some(path.to_path_buf());
        self.error_flag.store(false, Ordering::SeqCst);
        self.presenter.switch_mode(DisplayMode::Video);
        self.slideshow.stop();

        match inner.pipeline.start(path, self.audio.is_some()) {
            Ok(info) => {
                inner.state = VideoState::Playing;
                inner.info = Some(info);
                self.push_volume(inner.volume);
                self.arm_for_info(&mut inner, info, 0);
                log::info!("Playing video {}", path.display());
                Ok(())
            }
            Err(e) => {
                self.fail(&mut inner, &e);
                Err(e)
            }
        }
    }

    /// Soft transition to another video while one is active.
    ///
    /// Leaves the display mode and slideshow alone.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] unless playing or paused; otherwise the
    /// pipeline's error.
    pub fn switch_file(&self, path: &Path) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.state.is_active() {
            return Err(Error::InvalidState(format!(
                "switch requested while {:?}",
                inner.state
            )));
        }

        self.cancel_completion(&mut inner);
        inner.suspended = None;
        inner.pipeline.stop()?;
        inner.path = Some(path.to_path_buf());
        inner.info = None;

        match inner.pipeline.start(path, self.audio.is_some()) {
            Ok(info) => {
                inner.state = VideoState::Playing;
                inner.info = Some(info);
                self.arm_for_info(&mut inner, info, 0);
                log::info!("Switched video to {}", path.display());
                Ok(())
            }
            Err(e) => {
                self.fail(&mut inner, &e);
                Err(e)
            }
        }
    }

    /// Pauses a playing video. No-op in any other state.
    ///
    /// # Errors
    ///
    /// The pipeline's error; the controller then enters
    /// [`VideoState::Error`].
    pub fn pause(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state != VideoState::Playing {
            return Ok(());
        }
        if let Err(e) = inner.pipeline.pause() {
            self.fail(&mut inner, &e);
            return Err(e);
        }
        inner.state = VideoState::Paused;
        inner.suspended = self.suspend_completion(&mut inner);
        log::debug!("Video paused");
        Ok(())
    }

    /// Resumes a paused video. No-op in any other state.
    ///
    /// # Errors
    ///
    /// Same as [`pause`](Self::pause).
    pub fn resume(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state != VideoState::Paused {
            return Ok(());
        }
        if let Err(e) = inner.pipeline.resume() {
            self.fail(&mut inner, &e);
            return Err(e);
        }
        inner.state = VideoState::Playing;
        if let Some(remaining) = inner.suspended.take() {
            self.arm_completion(&mut inner, remaining);
        }
        log::debug!("Video resumed");
        Ok(())
    }

    /// Stops playback and cancels the completion timer. No-op when stopped.
    ///
    /// # Errors
    ///
    /// The pipeline's stop error; the controller is stopped regardless.
    pub fn stop(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state.is_stopped() {
            return Ok(());
        }
        self.error_flag.store(false, Ordering::SeqCst);
        self.cancel_completion(&mut inner);
        inner.suspended = None;
        inner.state = VideoState::Stopped;
        inner.info = None;
        log::debug!("Video stopped");
        inner.pipeline.stop()
    }

    /// Stops and plays the last path again after a short settle delay.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if nothing was ever played, otherwise the
    /// error of [`play`](Self::play).
    pub fn restart_current(&self) -> Result<()> {
        let path = self
            .current_path()
            .ok_or_else(|| Error::InvalidState("no video to restart".into()))?;
        self.stop()?;
        std::thread::sleep(self.config.restart_settle);
        log::debug!("Restarting video {}", path.display());
        self.play(&path)
    }

    /// Jumps to `position_ms` and re-arms the completion timer for the rest
    /// of the video.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] unless playing or paused; otherwise the
    /// pipeline's error.
    pub fn seek(&self, position_ms: u64) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.state.is_active() {
            return Err(Error::InvalidState(format!(
                "seek requested while {:?}",
                inner.state
            )));
        }

        if let Err(e) = inner.pipeline.seek(position_ms) {
            self.fail(&mut inner, &e);
            return Err(e);
        }

        self.cancel_completion(&mut inner);
        if let Some(info) = inner.info {
            if inner.state.is_paused() {
                inner.suspended = remaining_after(info, position_ms, self.config.completion_margin);
            } else {
                self.arm_for_info(&mut inner, info, position_ms);
            }
        }
        Ok(())
    }

    /// Sets the volume, clamped to 0–100, and pushes it to the audio sink.
    pub fn set_volume(&self, volume: u8) -> Volume {
        let volume = Volume::new(volume);
        self.inner.lock().volume = volume;
        self.push_volume(volume);
        volume
    }

    pub fn volume_up(&self) -> Volume {
        let volume = self.volume().increase();
        self.set_volume(volume.value())
    }

    pub fn volume_down(&self) -> Volume {
        let volume = self.volume().decrease();
        self.set_volume(volume.value())
    }

    #[must_use]
    pub fn volume(&self) -> Volume {
        self.inner.lock().volume
    }

    #[must_use]
    pub fn state(&self) -> VideoState {
        self.inner.lock().state
    }

    /// True after a failed pipeline call until it is cleared.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error_flag.load(Ordering::SeqCst) || self.state() == VideoState::Error
    }

    /// Path of the current or most recent video.
    #[must_use]
    pub fn current_path(&self) -> Option<PathBuf> {
        self.inner.lock().path.clone()
    }

    #[must_use]
    pub fn video_info(&self) -> Option<VideoInfo> {
        self.inner.lock().info
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.inner.lock().pipeline.stats()
    }

    fn fail(&self, inner: &mut ControllerInner, error: &Error) {
        log::warn!("Video pipeline failed: {error}");
        self.cancel_completion(inner);
        inner.suspended = None;
        inner.state = VideoState::Error;
        self.error_flag.store(true, Ordering::SeqCst);
        // Never leave a half-started worker behind.
        let _ = inner.pipeline.stop();
    }

    fn push_volume(&self, volume: Volume) {
        if let Some(audio) = &self.audio {
            if let Err(e) = audio.set_volume(volume) {
                log::warn!("Failed to set volume to {}: {e}", volume.value());
            }
        }
    }

    /// Ticket for the current playback.
    #[must_use]
    pub fn completion_ticket(&self) -> CompletionTicket {
        CompletionTicket(self.completion_generation.load(Ordering::SeqCst))
    }

    /// True if `ticket` still belongs to a video that is playing.
    #[must_use]
    pub fn is_current_completion(&self, ticket: CompletionTicket) -> bool {
        let inner = self.inner.lock();
        inner.state == VideoState::Playing
            && self.completion_generation.load(Ordering::SeqCst) == ticket.0
    }

    fn arm_for_info(&self, inner: &mut ControllerInner, info: VideoInfo, position_ms: u64) {
        match remaining_after(info, position_ms, self.config.completion_margin) {
            Some(remaining) => self.arm_completion(inner, remaining),
            None => log::debug!("Video has no duration; completion timer not armed"),
        }
    }

    fn arm_completion(&self, inner: &mut ControllerInner, after: Duration) {
        self.cancel_completion(inner);
        let generation = self.completion_generation.load(Ordering::SeqCst);
        let current = Arc::clone(&self.completion_generation);
        let on_complete = Arc::clone(&self.on_complete);

        let task = self.runtime.spawn(async move {
            tokio::time::sleep(after).await;
            if current.load(Ordering::SeqCst) == generation {
                log::debug!("Video completion timer fired");
                on_complete(CompletionTicket(generation));
            }
        });
        inner.completion = Some(CompletionTimer {
            task,
            deadline: Instant::now() + after,
        });
        log::debug!("Completion timer armed for {after:?}");
    }

    fn cancel_completion(&self, inner: &mut ControllerInner) {
        self.completion_generation.fetch_add(1, Ordering::SeqCst);
        if let Some(timer) = inner.completion.take() {
            timer.task.abort();
        }
    }

    /// Cancels the completion timer and returns how long it had left.
    fn suspend_completion(&self, inner: &mut ControllerInner) -> Option<Duration> {
        let remaining = inner
            .completion
            .as_ref()
            .map(|timer| timer.deadline.saturating_duration_since(Instant::now()));
        self.cancel_completion(inner);
        remaining
    }
}

impl Drop for VideoController {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if let Some(timer) = inner.completion.take() {
            timer.task.abort();
        }
    }
}

/// Time until completion from `position_ms`, or `None` without a duration.
fn remaining_after(info: VideoInfo, position_ms: u64, margin: Duration) -> Option<Duration> {
    info.has_duration()
        .then(|| Duration::from_millis(info.duration_ms.saturating_sub(position_ms)) + margin)
}

fn frame_sink(presenter: Arc<dyn Presenter>, error_flag: Arc<AtomicBool>) -> FrameSink {
    Arc::new(move |frame: &VideoFrame<'_>| {
        error_flag.store(false, Ordering::Relaxed);
        if let Err(e) = presenter.display_video_frame(frame) {
            log::debug!("Presenter rejected frame {}: {e}", frame.index);
        }
    })
}
