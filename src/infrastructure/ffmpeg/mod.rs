// SPDX-License-Identifier: MPL-2.0
//! `FFmpeg` adapter implementing the [`ContainerExtractor`] port.
//!
//! Only demuxing happens here. Video packets are returned still compressed
//! (MJPEG), the decode engine turns them into pixels. Audio packets are
//! reported but not decoded.
//!
//! [`ContainerExtractor`]: crate::application::port::ContainerExtractor

use crate::application::port::{ContainerExtractor, ContainerFrame};
use crate::domain::media::VideoInfo;
use crate::error::{Error, Result};
use std::path::Path;
use std::sync::OnceLock;

type InitOutcome = std::result::Result<(), String>;

static FFMPEG_INIT: OnceLock<InitOutcome> = OnceLock::new();

/// Initializes `FFmpeg` once per process and quiets its logging.
fn init_ffmpeg() -> Result<()> {
    init_once(&FFMPEG_INIT, || {
        ffmpeg_next::init().map_err(|e| e.to_string())?;
        // SAFETY: av_log_set_level only stores the global log level.
        unsafe {
            ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
        }
        Ok(())
    })
}

/// Runs `init` on first use; later calls report that first outcome again.
fn init_once(cell: &OnceLock<InitOutcome>, init: impl FnOnce() -> InitOutcome) -> Result<()> {
    cell.get_or_init(init)
        .clone()
        .map_err(|e| Error::Internal(format!("FFmpeg initialization failed: {e}")))
}

fn codec_error(context: &str, err: &ffmpeg_next::Error) -> Error {
    let mapped = Error::from_codec_message(&err.to_string());
    log::debug!("{context}: {err} ({})", mapped.kind_name());
    mapped
}

/// Open container state.
struct OpenContainer {
    input: ffmpeg_next::format::context::Input,
    video_stream: Option<usize>,
    audio_stream: Option<usize>,
    info: Option<VideoInfo>,
}

// SAFETY: the input context is only touched through `&mut self` of the
// owning extractor, which the pipeline keeps behind a mutex.
unsafe impl Send for OpenContainer {}

/// Demuxer for MP4/AVI containers.
#[derive(Default)]
pub struct FfmpegExtractor {
    open: Option<OpenContainer>,
}

impl FfmpegExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContainerExtractor for FfmpegExtractor {
    fn start(&mut self, path: &Path, want_video: bool, want_audio: bool) -> Result<()> {
        init_ffmpeg()?;
        self.stop();

        let input =
            ffmpeg_next::format::input(path).map_err(|e| codec_error("open container", &e))?;

        let (video_stream, info) = match input.streams().best(ffmpeg_next::media::Type::Video) {
            Some(stream) if want_video => {
                let decoder = ffmpeg_next::codec::context::Context::from_parameters(
                    stream.parameters(),
                )
                .and_then(|context| context.decoder().video())
                .map_err(|e| codec_error("read stream parameters", &e))?;

                let rate = stream.avg_frame_rate();
                let fps = if rate.denominator() != 0 {
                    f64::from(rate.numerator()) / f64::from(rate.denominator())
                } else {
                    0.0
                };
                let duration_ms = u64::try_from(input.duration())
                    .map(|micros| micros / 1000)
                    .unwrap_or(0);
                let info = VideoInfo {
                    width: decoder.width(),
                    height: decoder.height(),
                    fps,
                    duration_ms,
                };
                (Some(stream.index()), Some(info))
            }
            Some(_) => (None, None),
            None if want_video => {
                return Err(Error::Unsupported(format!(
                    "no video stream in {}",
                    path.display()
                )));
            }
            None => (None, None),
        };
        let audio_stream = want_audio
            .then(|| input.streams().best(ffmpeg_next::media::Type::Audio))
            .flatten()
            .map(|stream| stream.index());

        log::debug!(
            "Opened {} (video stream {video_stream:?}, audio stream {audio_stream:?})",
            path.display()
        );
        self.open = Some(OpenContainer {
            input,
            video_stream,
            audio_stream,
            info,
        });
        Ok(())
    }

    fn read_frame(&mut self) -> Result<ContainerFrame> {
        let open = self
            .open
            .as_mut()
            .ok_or_else(|| Error::InvalidState("extractor not started".into()))?;

        loop {
            let Some((stream, packet)) = open.input.packets().next() else {
                return Ok(ContainerFrame::EndOfStream);
            };
            let index = stream.index();
            if Some(index) == open.video_stream {
                let data = packet.data().unwrap_or_default();
                return Ok(ContainerFrame::Video(data.to_vec()));
            }
            if Some(index) == open.audio_stream {
                return Ok(ContainerFrame::Audio);
            }
        }
    }

    fn video_info(&self) -> Option<VideoInfo> {
        self.open.as_ref().and_then(|open| open.info)
    }

    fn seek(&mut self, position_ms: u64) -> Result<()> {
        let open = self
            .open
            .as_mut()
            .ok_or_else(|| Error::InvalidState("extractor not started".into()))?;

        let timestamp = i64::try_from(position_ms.saturating_mul(1000))
            .map_err(|_| Error::InvalidArgument(format!("seek position {position_ms} ms")))?;
        open.input
            .seek(timestamp, ..timestamp)
            .map_err(|e| codec_error("seek", &e))
    }

    fn stop(&mut self) {
        if self.open.take().is_some() {
            log::debug!("Container closed");
        }
    }
}
