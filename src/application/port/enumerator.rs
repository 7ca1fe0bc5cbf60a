// SPDX-License-Identifier: MPL-2.0
//! Directory enumeration port.

use crate::domain::media::MediaEntry;
use crate::error::Result;
use std::path::Path;

/// Lists the playable files of a directory.
///
/// Implementations must be idempotent and free of side effects beyond
/// producing their output. The returned order is the presentation order.
pub trait MediaEnumerator: Send + Sync {
    /// Scans `dir` and returns its media entries in presentation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    fn scan(&self, dir: &Path) -> Result<Vec<MediaEntry>>;
}
