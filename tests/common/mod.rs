// SPDX-License-Identifier: MPL-2.0
//! Collaborators for the integration tests.
//!
//! Images are plain files starting with `IMG:<w>x<h>;`, anything else fails
//! to decode. Videos are scripted: the extractor yields frames forever and
//! reports whatever duration the test asks for.
#![allow(dead_code)]

use parking_lot::Mutex;
use slideframe::app::AppParts;
use slideframe::application::port::{
    ContainerExtractor, ContainerFrame, DecodeEngine, ImageDecoder, ImageProcessor, Presenter,
};
use slideframe::config::{Config, BYTES_PER_PIXEL};
use slideframe::domain::media::{
    DecodedImage, ImageFormat, ImageInfo, ProcessPlan, VideoFrame, VideoInfo,
};
use slideframe::domain::playback::DisplayMode;
use slideframe::error::{Error, Result};
use slideframe::infrastructure::FsScanner;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let mut bytes = format!("IMG:{width}x{height};").into_bytes();
    bytes.resize(256, b'.');
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write image");
    path
}

pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![0u8; 512]).expect("write corrupt file");
    path
}

pub fn write_video(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![0u8; 1024]).expect("write video");
    path
}

pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

pub struct HeaderDecoder;

impl ImageDecoder for HeaderDecoder {
    fn decode(&self, bytes: &[u8], format: ImageFormat) -> Result<DecodedImage> {
        let info = self.get_info(bytes, format)?;
        let len = info.width as usize * info.height as usize * BYTES_PER_PIXEL;
        DecodedImage::new(info.width, info.height, vec![0; len])
            .ok_or_else(|| Error::Internal("size mismatch".into()))
    }

    fn get_info(&self, bytes: &[u8], _format: ImageFormat) -> Result<ImageInfo> {
        let header = std::str::from_utf8(&bytes[..bytes.len().min(32)]).unwrap_or_default();
        let dims = header
            .strip_prefix("IMG:")
            .and_then(|rest| rest.split(';').next())
            .and_then(|dims| dims.split_once('x'))
            .ok_or_else(|| Error::Internal("corrupt image".into()))?;
        let width = dims.0.parse().map_err(|_| Error::Internal("bad width".into()))?;
        let height = dims.1.parse().map_err(|_| Error::Internal("bad height".into()))?;
        Ok(ImageInfo::new(width, height))
    }
}

pub struct BlankProcessor;

impl ImageProcessor for BlankProcessor {
    fn apply(&self, _input: DecodedImage, plan: &ProcessPlan) -> Result<DecodedImage> {
        let target = plan.target;
        let len = target.width as usize * target.height as usize * BYTES_PER_PIXEL;
        DecodedImage::new(target.width, target.height, vec![0; len])
            .ok_or_else(|| Error::Internal("size mismatch".into()))
    }
}

/// Decodes every frame to 4x2 pixels.
pub struct TinyEngine;

impl DecodeEngine for TinyEngine {
    fn open(&self) -> Result<()> {
        Ok(())
    }

    fn close(&self) {}

    fn frame_info(&self, _compressed: &[u8]) -> Result<ImageInfo> {
        Ok(ImageInfo::new(4, 2))
    }

    fn decode_into(&self, compressed: &[u8], out: &mut [u8]) -> Result<usize> {
        let len = 4 * 2 * BYTES_PER_PIXEL;
        let fill = compressed.first().copied().unwrap_or(0);
        out.get_mut(..len)
            .ok_or_else(|| Error::ResourceExhausted("buffer too small".into()))?
            .fill(fill);
        Ok(len)
    }
}

/// Endless video frames with a fixed reported duration.
pub struct LoopingExtractor {
    duration_ms: u64,
    open: bool,
}

impl LoopingExtractor {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            open: false,
        }
    }
}

impl ContainerExtractor for LoopingExtractor {
    fn start(&mut self, _path: &Path, _want_video: bool, _want_audio: bool) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<ContainerFrame> {
        if !self.open {
            return Err(Error::InvalidState("not started".into()));
        }
        std::thread::sleep(Duration::from_millis(5));
        Ok(ContainerFrame::Video(vec![0x42; 8]))
    }

    fn video_info(&self) -> Option<VideoInfo> {
        self.open.then_some(VideoInfo {
            width: 4,
            height: 2,
            fps: 25.0,
            duration_ms: self.duration_ms,
        })
    }

    fn seek(&mut self, _position_ms: u64) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) {
        self.open = false;
    }
}

/// Remembers the latest progress and display mode.
#[derive(Default)]
pub struct ScreenProbe {
    pub progress: Mutex<Option<(usize, usize)>>,
    pub mode: Mutex<Option<DisplayMode>>,
    pub images: AtomicUsize,
    pub frames: AtomicUsize,
    pub settings_open: Mutex<bool>,
}

impl Presenter for ScreenProbe {
    fn display_image(&self, _image: &DecodedImage) -> Result<()> {
        self.images.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn display_video_frame(&self, _frame: &VideoFrame<'_>) -> Result<()> {
        self.frames.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn show_loading(&self) {}

    fn hide_loading(&self) {}

    fn update_progress(&self, current: usize, total: usize) {
        *self.progress.lock() = Some((current, total));
    }

    fn switch_mode(&self, mode: DisplayMode) {
        *self.mode.lock() = Some(mode);
    }

    fn show_settings(&self, _interval: Duration) {
        *self.settings_open.lock() = true;
    }

    fn hide_settings(&self) {
        *self.settings_open.lock() = false;
    }

    fn selected_interval(&self) -> Duration {
        Duration::from_secs(5)
    }
}

/// Config pointing at `dir` with default timings.
pub fn config_for(dir: &Path) -> Config {
    let mut config = Config::default();
    config.media_dir = Some(dir.to_path_buf());
    config
}

/// Real directory scan, fake decoding, scripted video of `video_ms`.
pub fn parts(config: &Config, screen: Arc<ScreenProbe>, video_ms: u64) -> AppParts {
    AppParts {
        enumerator: Arc::new(FsScanner::new(config.scan.sort_order, config.scan.max_files)),
        decoder: Arc::new(HeaderDecoder),
        processor: Arc::new(BlankProcessor),
        presenter: screen,
        engine: Arc::new(TinyEngine),
        extractor: Box::new(LoopingExtractor::new(video_ms)),
        audio: None,
    }
}
