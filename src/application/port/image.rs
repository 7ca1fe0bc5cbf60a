// SPDX-License-Identifier: MPL-2.0
//! Still-image decoding and processing ports.
//!
//! Both operations may be slow (they run on the hardware decoder and scaler);
//! callers block on them while holding the album lock.

use crate::domain::media::{DecodedImage, ImageFormat, ImageInfo, ProcessPlan, ScaleMode};
use crate::error::Result;

// =============================================================================
// ImageDecoder Trait
// =============================================================================

/// Port for decoding compressed still images to RGB565.
pub trait ImageDecoder: Send + Sync {
    /// Decodes a complete file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`](crate::error::Error::Unsupported) for
    /// images outside the decode envelope and
    /// [`Error::Internal`](crate::error::Error::Internal) for corrupt data.
    fn decode(&self, bytes: &[u8], format: ImageFormat) -> Result<DecodedImage>;

    /// Reads the dimensions from the header without decoding pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be parsed.
    fn get_info(&self, bytes: &[u8], format: ImageFormat) -> Result<ImageInfo>;
}

// =============================================================================
// ImageProcessor Trait
// =============================================================================

/// Port for the scale/crop engine.
pub trait ImageProcessor: Send + Sync {
    /// Plans how `src` is mapped onto `dst`.
    ///
    /// The default implementation uses [`ProcessPlan::compute`].
    ///
    /// # Errors
    ///
    /// Returns an error for degenerate sizes.
    fn compute_plan(&self, src: ImageInfo, dst: ImageInfo, mode: ScaleMode) -> Result<ProcessPlan> {
        ProcessPlan::compute(src, dst, mode)
    }

    /// Applies a plan. Returns `input` itself when the plan is an identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails.
    fn apply(&self, input: DecodedImage, plan: &ProcessPlan) -> Result<DecodedImage>;
}
