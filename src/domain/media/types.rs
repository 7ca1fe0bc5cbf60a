// SPDX-License-Identifier: MPL-2.0
//! Core media types for the domain layer.
//!
//! These types represent pure data without any decoder or display
//! dependencies.

use crate::config::BYTES_PER_PIXEL;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Kind of a collection entry, decided from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image (JPEG, PNG).
    Image,
    /// Video container (MP4, AVI) carrying MJPEG frames.
    Video,
    /// Anything else.
    Unknown,
}

impl MediaKind {
    /// Classifies a path by its extension, case-insensitively.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("jpg" | "jpeg" | "png") => Self::Image,
            Some("mp4" | "avi") => Self::Video,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(self, Self::Image)
    }

    #[must_use]
    pub fn is_video(self) -> bool {
        matches!(self, Self::Video)
    }
}

/// Compressed still-image format passed to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// One file of the collection, immutable after scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    name: String,
    path: PathBuf,
    kind: MediaKind,
    size: u64,
    modified: SystemTime,
}

impl MediaEntry {
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = MediaKind::from_path(&path);
        Self {
            name,
            path,
            kind,
            size,
            modified,
        }
    }

    /// File name without directory.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Size on disk in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub fn modified(&self) -> SystemTime {
        self.modified
    }
}

/// Width and height of an image or frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn fits_within(self, bound: ImageInfo) -> bool {
        self.width <= bound.width && self.height <= bound.height
    }

    #[must_use]
    pub fn is_landscape(self) -> bool {
        self.width >= self.height
    }
}

/// Decoded RGB565 pixels.
///
/// Cloning is cheap: the pixel buffer is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wraps RGB565 pixel data.
    ///
    /// Returns `None` if the buffer length doesn't match `width * height * 2`.
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        (pixels.len() == expected).then(|| Self {
            width,
            height,
            pixels: Arc::new(pixels),
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn info(&self) -> ImageInfo {
        ImageInfo::new(self.width, self.height)
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// True when both images share the same pixel allocation.
    #[must_use]
    pub fn shares_pixels_with(&self, other: &DecodedImage) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

/// Stream properties reported by a container extractor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Zero when the container doesn't declare a duration.
    pub duration_ms: u64,
}

impl VideoInfo {
    #[must_use]
    pub fn has_duration(&self) -> bool {
        self.duration_ms > 0
    }
}

/// One decoded video frame, borrowed from the pipeline's decode buffer.
///
/// Only valid inside the frame callback; copy the pixels to keep them.
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    /// RGB565 pixels, exactly the decoded size.
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Monotonic per playback session, starting at zero.
    pub index: u64,
    /// Which of the two decode buffers holds the pixels.
    pub slot: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_path_is_case_insensitive() {
        assert_eq!(MediaKind::from_path(Path::new("a.JPG")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("a.jpeg")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("a.Png")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("clip.MP4")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("clip.avi")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("notes.txt")), MediaKind::Unknown);
        assert_eq!(MediaKind::from_path(Path::new("no_extension")), MediaKind::Unknown);
    }

    #[test]
    fn image_format_from_path() {
        assert_eq!(ImageFormat::from_path(Path::new("x.jpeg")), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_path(Path::new("x.PNG")), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_path(Path::new("x.mp4")), None);
    }

    #[test]
    fn entry_derives_name_and_kind() {
        let entry = MediaEntry::new(PathBuf::from("/photos/beach.jpg"), 2048, SystemTime::UNIX_EPOCH);
        assert_eq!(entry.name(), "beach.jpg");
        assert_eq!(entry.kind(), MediaKind::Image);
        assert_eq!(entry.size(), 2048);
    }

    #[test]
    fn decoded_image_rejects_mismatched_length() {
        assert!(DecodedImage::new(2, 2, vec![0; 8]).is_some());
        assert!(DecodedImage::new(2, 2, vec![0; 7]).is_none());
    }

    #[test]
    fn clones_share_pixels() {
        let image = DecodedImage::new(1, 1, vec![0; 2]).expect("valid image");
        let copy = image.clone();
        assert!(image.shares_pixels_with(&copy));
    }

    #[test]
    fn info_orientation_and_fit() {
        let screen = ImageInfo::new(1024, 600);
        assert!(ImageInfo::new(800, 600).fits_within(screen));
        assert!(!ImageInfo::new(1920, 1080).fits_within(screen));
        assert!(ImageInfo::new(10, 10).is_landscape());
        assert!(!ImageInfo::new(600, 800).is_landscape());
    }
}
