// SPDX-License-Identifier: MPL-2.0
//! File-change notifications from the upload side.
//!
//! The uploader can produce bursts of notifications; the queue is small and
//! surplus events are dropped, since any one of them triggers a full rescan.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A change in the media directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Added(String),
    Deleted(String),
    /// Rescan without a specific cause.
    Refresh,
}

impl FileEvent {
    /// File name the event refers to, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Added(name) | Self::Deleted(name) => Some(name),
            Self::Refresh => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileEventSender {
    tx: Sender<FileEvent>,
    dropped: Arc<AtomicU64>,
}

impl FileEventSender {
    /// Queues `event`, dropping it if the queue is full.
    pub fn notify(&self, event: FileEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!("File event queue full, dropping {event:?}");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Events dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

pub(crate) fn queue(capacity: usize) -> (FileEventSender, Receiver<FileEvent>) {
    let (tx, rx) = bounded(capacity);
    (
        FileEventSender {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        rx,
    )
}
