// SPDX-License-Identifier: MPL-2.0
//! Container extraction port.
//!
//! The extractor demuxes a video container. Compressed video frames are
//! handed back to the caller one at a time; audio is routed by the extractor
//! itself to the audio sink it was built with.
//!
//! # Lifecycle
//!
//! 1. `start()` opens a file
//! 2. `read_frame()` repeatedly until `EndOfStream` or an error
//! 3. `seek()` may reposition between reads
//! 4. `stop()` closes the file

use crate::domain::media::VideoInfo;
use crate::error::Result;
use std::path::Path;

/// Outcome of one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerFrame {
    /// A compressed (MJPEG) video frame.
    Video(Vec<u8>),
    /// An audio packet, already delivered to the audio sink.
    Audio,
    /// Clean end of the stream.
    EndOfStream,
}

pub trait ContainerExtractor: Send {
    /// Opens `path` and prepares the requested tracks.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or has no usable track.
    fn start(&mut self, path: &Path, want_video: bool, want_audio: bool) -> Result<()>;

    /// Reads the next frame. May block for the duration of one frame read.
    ///
    /// # Errors
    ///
    /// Returns an error on read or demux failure.
    fn read_frame(&mut self) -> Result<ContainerFrame>;

    /// Video stream properties, once started.
    fn video_info(&self) -> Option<VideoInfo>;

    /// Repositions to `position_ms`.
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot seek.
    fn seek(&mut self, position_ms: u64) -> Result<()>;

    /// Closes the current file. Idempotent.
    fn stop(&mut self);
}
