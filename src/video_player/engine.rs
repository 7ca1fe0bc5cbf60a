// SPDX-License-Identifier: MPL-2.0
//! Reference-counted access to the hardware decode engine.
//!
//! The image path and the video path both decode on the same engine. The
//! engine is powered up when the first user acquires it and powered down when
//! the last [`EngineLease`] is dropped.

use crate::application::port::DecodeEngine;
use crate::domain::media::ImageInfo;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

struct EngineShared {
    engine: Arc<dyn DecodeEngine>,
    users: Mutex<usize>,
}

/// Shared owner of the decode engine.
#[derive(Clone)]
pub struct SharedEngine {
    shared: Arc<EngineShared>,
}

impl std::fmt::Debug for SharedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEngine")
            .field("users", &self.users())
            .finish_non_exhaustive()
    }
}

impl SharedEngine {
    pub fn new(engine: Arc<dyn DecodeEngine>) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                engine,
                users: Mutex::new(0),
            }),
        }
    }

    /// Registers a user, opening the engine on the first one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the reference count cannot be locked
    /// within `timeout`, or the engine's error if opening it fails.
    pub fn acquire(&self, timeout: Duration) -> Result<EngineLease> {
        let mut users = self
            .shared
            .users
            .try_lock_for(timeout)
            .ok_or_else(|| Error::Timeout(format!("decode engine lock after {timeout:?}")))?;

        if *users == 0 {
            self.shared.engine.open()?;
            log::debug!("Decode engine opened");
        }
        *users += 1;

        Ok(EngineLease {
            shared: Arc::clone(&self.shared),
        })
    }

    /// Number of live leases.
    #[must_use]
    pub fn users(&self) -> usize {
        *self.shared.users.lock()
    }
}

/// One user's hold on the decode engine. Releases it on drop.
pub struct EngineLease {
    shared: Arc<EngineShared>,
}

impl EngineLease {
    /// See [`DecodeEngine::frame_info`].
    ///
    /// # Errors
    ///
    /// Propagates the engine's error.
    pub fn frame_info(&self, compressed: &[u8]) -> Result<ImageInfo> {
        self.shared.engine.frame_info(compressed)
    }

    /// See [`DecodeEngine::decode_into`].
    ///
    /// # Errors
    ///
    /// Propagates the engine's error.
    pub fn decode_into(&self, compressed: &[u8], out: &mut [u8]) -> Result<usize> {
        self.shared.engine.decode_into(compressed, out)
    }
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        let mut users = self.shared.users.lock();
        *users = users.saturating_sub(1);
        if *users == 0 {
            self.shared.engine.close();
            log::debug!("Decode engine closed");
        }
    }
}
