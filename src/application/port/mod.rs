// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that infrastructure adapters implement.
//! These traits use only domain types, so the playback services stay
//! independent of any decoder library, display stack or filesystem.
//!
//! # Available Ports
//!
//! - [`enumerator`]: Directory scanning
//! - [`image`]: Still-image decoding and scale/crop processing
//! - [`presenter`]: Display, overlays and settings panel
//! - [`audio`]: Optional audio output volume
//! - [`extractor`]: Container demuxing for video playback
//! - [`engine`]: Hardware decode engine shared by image and video paths
//!
//! # Design Notes
//!
//! - All traits are object-safe and held as `Arc<dyn _>` or `Box<dyn _>`
//! - Methods are synchronous; callers decide which thread blocks on them
//! - Methods return [`crate::error::Result`]

pub mod audio;
pub mod engine;
pub mod enumerator;
pub mod extractor;
pub mod image;
pub mod presenter;

// Re-export main types for convenience
pub use audio::AudioSink;
pub use engine::DecodeEngine;
pub use enumerator::MediaEnumerator;
pub use extractor::{ContainerExtractor, ContainerFrame};
pub use image::{ImageDecoder, ImageProcessor};
pub use presenter::Presenter;
