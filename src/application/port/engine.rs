// SPDX-License-Identifier: MPL-2.0
//! Hardware decode engine port.
//!
//! There is one engine per device, shared by the image and video paths. It
//! is reached through [`SharedEngine`](crate::video_player::engine::SharedEngine),
//! which powers it up on first use and down after the last user leaves.

use crate::domain::media::ImageInfo;
use crate::error::Result;

pub trait DecodeEngine: Send + Sync {
    /// Powers the engine up. Called when the first user acquires it.
    ///
    /// # Errors
    ///
    /// Returns an error if the hardware cannot be initialised.
    fn open(&self) -> Result<()>;

    /// Powers the engine down. Called when the last user releases it.
    fn close(&self);

    /// Reads the dimensions of one compressed frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame header is invalid.
    fn frame_info(&self, compressed: &[u8]) -> Result<ImageInfo>;

    /// Decodes one compressed frame to RGB565 into `out`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceExhausted`](crate::error::Error::ResourceExhausted)
    /// if `out` is too small, or another error if decoding fails.
    fn decode_into(&self, compressed: &[u8], out: &mut [u8]) -> Result<usize>;
}
