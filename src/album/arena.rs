// SPDX-License-Identifier: MPL-2.0
//! Scratch memory for compressed image files.
//!
//! The arena hands out one allocation at a time and reuses the same backing
//! buffer for every request; the previous allocation is gone once the next
//! one is made. The `&mut` borrow returned by [`DecodeArena::alloc`] makes a
//! second live allocation impossible, but the arena itself is not
//! synchronized: it lives inside the album lock and is only touched while
//! that lock is held.

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct DecodeArena {
    buffer: Vec<u8>,
    capacity: usize,
}

impl DecodeArena {
    /// Creates an empty arena that will never grow past `capacity` bytes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::new(),
            capacity,
        }
    }

    /// Resets the arena and returns `len` zeroed bytes.
    ///
    /// The backing buffer grows to the largest request seen and is never
    /// shrunk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceExhausted`] if `len` exceeds the capacity.
    pub fn alloc(&mut self, len: usize) -> Result<&mut [u8]> {
        if len > self.capacity {
            return Err(Error::ResourceExhausted(format!(
                "{len} bytes requested from a {} byte arena",
                self.capacity
            )));
        }
        if self.buffer.len() < len {
            self.buffer.resize(len, 0);
        }
        let slice = &mut self.buffer[..len];
        slice.fill(0);
        Ok(slice)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest allocation made so far.
    #[must_use]
    pub fn high_water(&self) -> usize {
        self.buffer.len()
    }
}
