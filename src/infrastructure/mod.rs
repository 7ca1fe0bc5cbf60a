// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! Concrete implementations of the port traits defined in
//! `application::port`, wrapping the filesystem, the `image` crate and
//! `FFmpeg`.
//!
//! # Available Adapters
//!
//! - [`fs_scanner`]: directory enumeration (implements [`MediaEnumerator`])
//! - [`image_rs`]: software decode and scaling (implements [`ImageDecoder`],
//!   [`ImageProcessor`] and [`DecodeEngine`])
//! - [`log_presenter`]: headless presenter writing to the log
//! - `ffmpeg`: container demuxing, behind the `ffmpeg` feature
//!
//! [`MediaEnumerator`]: crate::application::port::MediaEnumerator
//! [`ImageDecoder`]: crate::application::port::ImageDecoder
//! [`ImageProcessor`]: crate::application::port::ImageProcessor
//! [`DecodeEngine`]: crate::application::port::DecodeEngine

#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
pub mod fs_scanner;
pub mod image_rs;
pub mod log_presenter;
mod unavailable;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegExtractor;
pub use fs_scanner::FsScanner;
pub use image_rs::{ImageRsDecoder, SoftwareProcessor};
pub use log_presenter::LogPresenter;
pub use unavailable::UnavailableExtractor;

use crate::application::port::ContainerExtractor;

/// The container extractor this build supports.
#[must_use]
pub fn default_extractor() -> Box<dyn ContainerExtractor> {
    #[cfg(feature = "ffmpeg")]
    {
        Box::new(FfmpegExtractor::new())
    }
    #[cfg(not(feature = "ffmpeg"))]
    {
        log::info!("Built without the `ffmpeg` feature; videos will be skipped");
        Box::new(UnavailableExtractor)
    }
}
