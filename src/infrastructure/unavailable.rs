// SPDX-License-Identifier: MPL-2.0
//! Extractor for builds without a container backend.

use crate::application::port::{ContainerExtractor, ContainerFrame};
use crate::domain::media::VideoInfo;
use crate::error::{Error, Result};
use std::path::Path;

/// Refuses every file, so the album skips videos.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableExtractor;

impl ContainerExtractor for UnavailableExtractor {
    fn start(&mut self, path: &Path, _want_video: bool, _want_audio: bool) -> Result<()> {
        Err(Error::Unsupported(format!(
            "video playback not available for {}",
            path.display()
        )))
    }

    fn read_frame(&mut self) -> Result<ContainerFrame> {
        Err(Error::InvalidState("extractor not started".into()))
    }

    fn video_info(&self) -> Option<VideoInfo> {
        None
    }

    fn seek(&mut self, _position_ms: u64) -> Result<()> {
        Err(Error::InvalidState("extractor not started".into()))
    }

    fn stop(&mut self) {}
}
