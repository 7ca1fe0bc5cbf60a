// SPDX-License-Identifier: MPL-2.0
//! Ordered media collection with a wrapping cursor.

use super::MediaEntry;
use crate::error::{Error, Result};

/// Ordered list of scanned entries and the position currently shown.
///
/// `current_index` always lies in `[0, len)` while the collection is
/// non-empty. The collection is rebuilt wholesale by [`replace`]; entries are
/// never edited in place.
///
/// [`replace`]: MediaCollection::replace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaCollection {
    entries: Vec<MediaEntry>,
    current_index: usize,
}

impl MediaCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection positioned on the first entry.
    #[must_use]
    pub fn from_entries(entries: Vec<MediaEntry>) -> Self {
        Self {
            entries,
            current_index: 0,
        }
    }

    /// Swaps in a fresh scan result and moves the cursor to `index % len`.
    pub fn replace(&mut self, entries: Vec<MediaEntry>, index: usize) {
        self.entries = entries;
        self.current_index = if self.entries.is_empty() {
            0
        } else {
            index % self.entries.len()
        };
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_index = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current position, or `None` for an empty collection.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.current_index)
    }

    #[must_use]
    pub fn current(&self) -> Option<&MediaEntry> {
        self.entries.get(self.current_index)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MediaEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    /// Moves the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `index` is out of range; the
    /// cursor is left unchanged.
    pub fn set_current_index(&mut self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(Error::InvalidArgument(format!(
                "index {index} out of range for {} entries",
                self.entries.len()
            )));
        }
        self.current_index = index;
        Ok(())
    }

    /// Index `step` positions away from `from`, wrapping in both directions.
    ///
    /// Returns `None` for an empty collection.
    #[must_use]
    pub fn offset_from(&self, from: usize, step: isize) -> Option<usize> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        let len = len as isize;
        let from = (from % self.entries.len()) as isize;
        Some((from + step % len + len).rem_euclid(len) as usize)
    }

    /// Index following the cursor, wrapping to the start.
    #[must_use]
    pub fn next_index(&self) -> Option<usize> {
        self.offset_from(self.current_index, 1)
    }

    /// Index preceding the cursor, wrapping to the end.
    #[must_use]
    pub fn previous_index(&self) -> Option<usize> {
        self.offset_from(self.current_index, -1)
    }

    /// Finds an entry by file name.
    #[must_use]
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name() == name)
    }
}
