// SPDX-License-Identifier: MPL-2.0
//! In-memory collaborators shared by the unit tests.
//!
//! Each fake records what it was asked to do so tests can assert on the
//! interaction, and can be scripted to fail in the ways real hardware does.

use crate::album::{AlbumCollaborators, AlbumConfig, AlbumNavigator};
use crate::application::port::{
    AudioSink, ContainerExtractor, ContainerFrame, DecodeEngine, ImageDecoder, ImageProcessor,
    MediaEnumerator, Presenter,
};
use crate::config::{BYTES_PER_PIXEL, MAX_DECODE_HEIGHT, MAX_DECODE_WIDTH};
use crate::domain::media::{
    DecodedImage, ImageFormat, ImageInfo, MediaEntry, ProcessPlan, VideoFrame, VideoInfo,
};
use crate::domain::playback::DisplayMode;
use crate::domain::volume::Volume;
use crate::error::{Error, Result};
use crate::slideshow::SlideshowTimer;
use crate::video_player::{
    ControllerConfig, PipelineConfig, SharedEngine, VideoCollaborators, VideoController,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::runtime::Handle;

// =============================================================================
// Media Files
// =============================================================================

/// Writes a fake image the [`FakeDecoder`] understands.
///
/// The header encodes the dimensions; the file is padded past the minimum
/// accepted size.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let mut bytes = format!("IMG:{width}x{height};").into_bytes();
    bytes.resize(256, b'.');
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write image");
    path
}

/// Writes a file with a valid size but content no decoder accepts.
pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![0u8; 512]).expect("write corrupt file");
    path
}

/// Writes a placeholder container; only the extractor fake reads videos.
pub fn write_video(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![0u8; 1024]).expect("write video");
    path
}

/// Builds entries for `paths` as the scanner would.
pub fn entries_for(paths: &[PathBuf]) -> Vec<MediaEntry> {
    paths
        .iter()
        .map(|p| {
            let size = std::fs::metadata(p).map(|m| m.len()).unwrap_or(0);
            MediaEntry::new(p.clone(), size, SystemTime::UNIX_EPOCH)
        })
        .collect()
}

fn parse_header(bytes: &[u8]) -> Result<ImageInfo> {
    let text = std::str::from_utf8(bytes.get(..32).unwrap_or(bytes)).unwrap_or_default();
    let dims = text
        .strip_prefix("IMG:")
        .and_then(|rest| rest.split(';').next())
        .ok_or_else(|| Error::Internal("corrupt image data".into()))?;
    let (w, h) = dims
        .split_once('x')
        .ok_or_else(|| Error::Internal("corrupt image header".into()))?;
    let width = w.parse().map_err(|_| Error::Internal("bad width".into()))?;
    let height = h.parse().map_err(|_| Error::Internal("bad height".into()))?;
    Ok(ImageInfo::new(width, height))
}

// =============================================================================
// Enumerator
// =============================================================================

/// Enumerator returning whatever list the test sets.
#[derive(Default)]
pub struct ListEnumerator {
    entries: Mutex<Vec<MediaEntry>>,
    pub scans: AtomicUsize,
}

impl ListEnumerator {
    pub fn new(entries: Vec<MediaEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            scans: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, entries: Vec<MediaEntry>) {
        *self.entries.lock() = entries;
    }
}

impl MediaEnumerator for ListEnumerator {
    fn scan(&self, _dir: &Path) -> Result<Vec<MediaEntry>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.lock().clone())
    }
}

// =============================================================================
// Image Decoder / Processor
// =============================================================================

#[derive(Default)]
pub struct FakeDecoder {
    pub decodes: AtomicUsize,
}

impl ImageDecoder for FakeDecoder {
    fn decode(&self, bytes: &[u8], _format: ImageFormat) -> Result<DecodedImage> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        let info = self.get_info(bytes, ImageFormat::Jpeg)?;
        if info.width > MAX_DECODE_WIDTH || info.height > MAX_DECODE_HEIGHT {
            return Err(Error::Unsupported(format!(
                "{}x{} exceeds decode envelope",
                info.width, info.height
            )));
        }
        let len = info.width as usize * info.height as usize * BYTES_PER_PIXEL;
        DecodedImage::new(info.width, info.height, vec![0; len])
            .ok_or_else(|| Error::Internal("pixel length mismatch".into()))
    }

    fn get_info(&self, bytes: &[u8], _format: ImageFormat) -> Result<ImageInfo> {
        parse_header(bytes)
    }
}

#[derive(Default)]
pub struct FakeProcessor {
    pub plans: Mutex<Vec<ProcessPlan>>,
}

impl ImageProcessor for FakeProcessor {
    fn apply(&self, input: DecodedImage, plan: &ProcessPlan) -> Result<DecodedImage> {
        self.plans.lock().push(*plan);
        if plan.is_identity_for(input.info()) {
            return Ok(input);
        }
        let len = plan.target.width as usize * plan.target.height as usize * BYTES_PER_PIXEL;
        DecodedImage::new(plan.target.width, plan.target.height, vec![0; len])
            .ok_or_else(|| Error::Internal("pixel length mismatch".into()))
    }
}

// =============================================================================
// Presenter / Audio
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PresenterCall {
    Image(u32, u32),
    VideoFrame(u64),
    ShowLoading,
    HideLoading,
    Progress(usize, usize),
    Mode(DisplayMode),
    ShowSettings(Duration),
    HideSettings,
    Volume(u8),
}

pub struct RecordingPresenter {
    calls: Mutex<Vec<PresenterCall>>,
    selected: Mutex<Duration>,
}

impl Default for RecordingPresenter {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            selected: Mutex::new(Duration::from_secs(5)),
        }
    }
}

impl RecordingPresenter {
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn select_interval(&self, interval: Duration) {
        *self.selected.lock() = interval;
    }

    pub fn frames_shown(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, PresenterCall::VideoFrame(_)))
            .count()
    }

    pub fn last_mode(&self) -> Option<DisplayMode> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            PresenterCall::Mode(mode) => Some(*mode),
            _ => None,
        })
    }

    pub fn last_progress(&self) -> Option<(usize, usize)> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            PresenterCall::Progress(current, total) => Some((*current, *total)),
            _ => None,
        })
    }

    fn push(&self, call: PresenterCall) {
        self.calls.lock().push(call);
    }
}

impl Presenter for RecordingPresenter {
    fn display_image(&self, image: &DecodedImage) -> Result<()> {
        self.push(PresenterCall::Image(image.width(), image.height()));
        Ok(())
    }

    fn display_video_frame(&self, frame: &VideoFrame<'_>) -> Result<()> {
        self.push(PresenterCall::VideoFrame(frame.index));
        Ok(())
    }

    fn show_loading(&self) {
        self.push(PresenterCall::ShowLoading);
    }

    fn hide_loading(&self) {
        self.push(PresenterCall::HideLoading);
    }

    fn update_progress(&self, current: usize, total: usize) {
        self.push(PresenterCall::Progress(current, total));
    }

    fn switch_mode(&self, mode: DisplayMode) {
        self.push(PresenterCall::Mode(mode));
    }

    fn show_settings(&self, interval: Duration) {
        self.push(PresenterCall::ShowSettings(interval));
    }

    fn hide_settings(&self) {
        self.push(PresenterCall::HideSettings);
    }

    fn selected_interval(&self) -> Duration {
        *self.selected.lock()
    }

    fn show_volume(&self, volume: Volume) {
        self.push(PresenterCall::Volume(volume.value()));
    }
}

#[derive(Default)]
pub struct RecordingAudio {
    pub volumes: Mutex<Vec<u8>>,
}

impl AudioSink for RecordingAudio {
    fn set_volume(&self, volume: Volume) -> Result<()> {
        self.volumes.lock().push(volume.value());
        Ok(())
    }
}

// =============================================================================
// Decode Engine
// =============================================================================

/// Decodes every frame to a fixed 4x2 RGB565 image filled with the first
/// compressed byte. A frame starting with `0x00` is treated as corrupt.
#[derive(Default)]
pub struct FakeEngine {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub open_delay: Duration,
}

impl FakeEngine {
    pub const FRAME: ImageInfo = ImageInfo {
        width: 4,
        height: 2,
    };

    pub fn with_open_delay(delay: Duration) -> Self {
        Self {
            open_delay: delay,
            ..Self::default()
        }
    }
}

impl DecodeEngine for FakeEngine {
    fn open(&self) -> Result<()> {
        std::thread::sleep(self.open_delay);
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn frame_info(&self, compressed: &[u8]) -> Result<ImageInfo> {
        match compressed.first() {
            Some(0) | None => Err(Error::Internal("corrupt frame".into())),
            Some(_) => Ok(Self::FRAME),
        }
    }

    fn decode_into(&self, compressed: &[u8], out: &mut [u8]) -> Result<usize> {
        let info = self.frame_info(compressed)?;
        let len = info.width as usize * info.height as usize * BYTES_PER_PIXEL;
        let target = out
            .get_mut(..len)
            .ok_or_else(|| Error::ResourceExhausted("output buffer too small".into()))?;
        target.fill(compressed[0]);
        Ok(len)
    }
}

// =============================================================================
// Container Extractor
// =============================================================================

/// What a [`ScriptedExtractor`] was asked to do.
#[derive(Default)]
pub struct ExtractorProbe {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub reads: AtomicUsize,
    pub seeks: Mutex<Vec<u64>>,
    pub paths: Mutex<Vec<PathBuf>>,
}

/// Replays a fixed frame script on every start.
pub struct ScriptedExtractor {
    script: Vec<ContainerFrame>,
    queue: VecDeque<ContainerFrame>,
    endless: bool,
    info: Option<VideoInfo>,
    read_delay: Duration,
    first_read_stall: Duration,
    stalled: bool,
    failing: Vec<PathBuf>,
    open: bool,
    probe: Arc<ExtractorProbe>,
}

impl ScriptedExtractor {
    /// `count` valid video frames, then end of stream.
    pub fn frames(count: usize) -> Self {
        Self::with_script((0..count).map(|i| video_frame(8, i as u8 + 1)).collect())
    }

    /// Valid video frames forever.
    pub fn endless() -> Self {
        let mut extractor = Self::with_script(Vec::new());
        extractor.endless = true;
        extractor
    }

    pub fn with_script(script: Vec<ContainerFrame>) -> Self {
        Self {
            script,
            queue: VecDeque::new(),
            endless: false,
            info: Some(VideoInfo {
                width: FakeEngine::FRAME.width,
                height: FakeEngine::FRAME.height,
                fps: 25.0,
                duration_ms: 0,
            }),
            read_delay: Duration::ZERO,
            first_read_stall: Duration::ZERO,
            stalled: false,
            failing: Vec::new(),
            open: false,
            probe: Arc::new(ExtractorProbe::default()),
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        if let Some(info) = self.info.as_mut() {
            info.duration_ms = duration_ms;
        }
        self
    }

    pub fn without_video_info(mut self) -> Self {
        self.info = None;
        self
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    /// Blocks inside the first read after each start.
    pub fn with_first_read_stall(mut self, stall: Duration) -> Self {
        self.first_read_stall = stall;
        self
    }

    /// `start` fails for paths ending with `name`.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.push(PathBuf::from(name));
        self
    }

    pub fn probe(&self) -> Arc<ExtractorProbe> {
        Arc::clone(&self.probe)
    }
}

/// A compressed frame of `len` bytes filled with `fill`.
pub fn video_frame(len: usize, fill: u8) -> ContainerFrame {
    ContainerFrame::Video(vec![fill; len])
}

impl ContainerExtractor for ScriptedExtractor {
    fn start(&mut self, path: &Path, _want_video: bool, _want_audio: bool) -> Result<()> {
        self.probe.paths.lock().push(path.to_path_buf());
        if self.failing.iter().any(|f| path.ends_with(f)) {
            return Err(Error::Unsupported(format!("cannot open {}", path.display())));
        }
        self.probe.starts.fetch_add(1, Ordering::SeqCst);
        self.queue = self.script.iter().cloned().collect();
        self.stalled = false;
        self.open = true;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<ContainerFrame> {
        if !self.open {
            return Err(Error::InvalidState("extractor not started".into()));
        }
        self.probe.reads.fetch_add(1, Ordering::SeqCst);
        if !self.stalled {
            self.stalled = true;
            std::thread::sleep(self.first_read_stall);
        }
        std::thread::sleep(self.read_delay);
        if let Some(frame) = self.queue.pop_front() {
            return Ok(frame);
        }
        if self.endless {
            Ok(video_frame(8, 0x7f))
        } else {
            Ok(ContainerFrame::EndOfStream)
        }
    }

    fn video_info(&self) -> Option<VideoInfo> {
        if self.open {
            self.info
        } else {
            None
        }
    }

    fn seek(&mut self, position_ms: u64) -> Result<()> {
        self.probe.seeks.lock().push(position_ms);
        Ok(())
    }

    fn stop(&mut self) {
        if self.open {
            self.probe.stops.fetch_add(1, Ordering::SeqCst);
        }
        self.open = false;
    }
}

/// Polls `condition` every few milliseconds until it holds or `timeout`
/// elapses. Returns the final evaluation.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

// =============================================================================
// Album Harness
// =============================================================================

/// A navigator wired to the fakes above over a temporary media directory.
///
/// Must be built inside a Tokio runtime; the slideshow and completion timers
/// are spawned on the current handle.
pub struct TestAlbum {
    pub album: Arc<AlbumNavigator>,
    pub enumerator: Arc<ListEnumerator>,
    pub decoder: Arc<FakeDecoder>,
    pub processor: Arc<FakeProcessor>,
    pub presenter: Arc<RecordingPresenter>,
    /// Advance ticks and completion callbacks fired by the timers.
    pub advances: Arc<AtomicUsize>,
    pub completions: Arc<AtomicUsize>,
    pub dir: tempfile::TempDir,
}

impl TestAlbum {
    pub fn new(files: impl FnOnce(&Path) -> Vec<PathBuf>) -> Self {
        Self::with_extractor(files, ScriptedExtractor::endless())
    }

    pub fn with_extractor(
        files: impl FnOnce(&Path) -> Vec<PathBuf>,
        extractor: ScriptedExtractor,
    ) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = files(dir.path());

        let enumerator = Arc::new(ListEnumerator::new(entries_for(&paths)));
        let decoder = Arc::new(FakeDecoder::default());
        let processor = Arc::new(FakeProcessor::default());
        let presenter = Arc::new(RecordingPresenter::default());
        let engine = SharedEngine::new(Arc::new(FakeEngine::default()));
        let advances = Arc::new(AtomicUsize::new(0));
        let completions = Arc::new(AtomicUsize::new(0));

        let ticks = Arc::clone(&advances);
        let slideshow = SlideshowTimer::new(
            Handle::current(),
            Duration::from_secs(5),
            Duration::from_secs(3),
            Arc::new(move || {
                ticks.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let done = Arc::clone(&completions);
        let video = Arc::new(VideoController::new(
            VideoCollaborators {
                extractor: Box::new(extractor),
                engine: engine.clone(),
                presenter: presenter.clone(),
                audio: None,
            },
            slideshow.clone(),
            Handle::current(),
            Arc::new(move |_| {
                done.fetch_add(1, Ordering::SeqCst);
            }),
            ControllerConfig {
                pipeline: PipelineConfig {
                    buffer_bytes: 64,
                    stop_timeout: Duration::from_millis(100),
                    ..PipelineConfig::default()
                },
                ..ControllerConfig::default()
            },
        ));

        let album = Arc::new(AlbumNavigator::new(
            AlbumCollaborators {
                enumerator: enumerator.clone(),
                decoder: decoder.clone(),
                processor: processor.clone(),
                presenter: presenter.clone(),
                engine,
            },
            slideshow,
            video,
            AlbumConfig::new(dir.path()),
        ));

        Self {
            album,
            enumerator,
            decoder,
            processor,
            presenter,
            advances,
            completions,
            dir,
        }
    }

    /// `count` displayable images named `img0.jpg`, `img1.jpg`, ...
    pub fn images(count: usize) -> impl FnOnce(&Path) -> Vec<PathBuf> {
        move |dir| {
            (0..count)
                .map(|i| write_image(dir, &format!("img{i}.jpg"), 640, 480))
                .collect()
        }
    }
}
