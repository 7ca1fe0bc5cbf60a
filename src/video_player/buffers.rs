// SPDX-License-Identifier: MPL-2.0
//! Rotating decode buffers for video frames.
//!
//! Two buffers sized for the largest supported frame are allocated once and
//! reused for the whole pipeline lifetime. Frame *k* and frame *k + 1* always
//! land in different buffers, so the presenter can keep reading one while the
//! next frame decodes into the other.

use crate::config::DECODE_BUFFER_COUNT;

#[derive(Debug)]
pub struct DecodeBuffers {
    slots: [Vec<u8>; DECODE_BUFFER_COUNT],
    /// Slot written by the most recent committed frame.
    current: usize,
}

impl DecodeBuffers {
    /// Allocates both buffers up front.
    #[must_use]
    pub fn new(bytes_per_buffer: usize) -> Self {
        Self {
            slots: std::array::from_fn(|_| vec![0; bytes_per_buffer]),
            // The first committed frame goes to slot 0.
            current: DECODE_BUFFER_COUNT - 1,
        }
    }

    /// Size of one buffer in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots[0].len()
    }

    /// Slot the next frame will be decoded into.
    #[must_use]
    pub fn next_slot(&self) -> usize {
        (self.current + 1) % DECODE_BUFFER_COUNT
    }

    /// Marks `slot` as holding the newest frame.
    pub fn commit(&mut self, slot: usize) {
        self.current = slot % DECODE_BUFFER_COUNT;
    }

    /// Forgets rotation history so a new session starts at slot 0.
    pub fn reset(&mut self) {
        self.current = DECODE_BUFFER_COUNT - 1;
    }

    #[must_use]
    pub fn slot(&self, slot: usize) -> &[u8] {
        &self.slots[slot % DECODE_BUFFER_COUNT]
    }

    pub fn slot_mut(&mut self, slot: usize) -> &mut [u8] {
        &mut self.slots[slot % DECODE_BUFFER_COUNT]
    }
}
