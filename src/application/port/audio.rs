// SPDX-License-Identifier: MPL-2.0
//! Audio output port.

use crate::domain::volume::Volume;
use crate::error::Result;

/// Optional audio output. When absent, videos play without sound.
pub trait AudioSink: Send + Sync {
    /// Applies a new output volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the change.
    fn set_volume(&self, volume: Volume) -> Result<()>;
}
