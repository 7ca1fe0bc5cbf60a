// SPDX-License-Identifier: MPL-2.0
//! Media domain types.
//!
//! This module contains core media types that are independent of any
//! decoder, display or filesystem concerns.

pub mod collection;
pub mod plan;
pub mod types;

// Re-export commonly used types
pub use collection::MediaCollection;
pub use plan::{CropRect, ProcessOp, ProcessPlan, ScaleMode};
pub use types::{
    DecodedImage, ImageFormat, ImageInfo, MediaEntry, MediaKind, VideoFrame, VideoInfo,
};
