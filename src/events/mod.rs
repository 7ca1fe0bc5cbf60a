// SPDX-License-Identifier: MPL-2.0
//! Event plumbing between input sources and the album.
//!
//! Every source (touch input, slideshow ticks, video completion, file
//! uploads, device hot-plug) posts an [`AppEvent`] through an
//! [`EventSender`]. A single [`Dispatcher`] thread drains the queues, so
//! handlers never run concurrently with each other.

pub mod device;
pub mod dispatcher;
pub mod files;

pub use device::DeviceCoordinator;
pub use dispatcher::{Dispatcher, DispatcherHandle};
pub use files::{FileEvent, FileEventSender};

use crate::config::{
    DEVICE_EVENT_QUEUE_CAPACITY, FILE_EVENT_QUEUE_CAPACITY, UI_EVENT_QUEUE_CAPACITY,
};
use crate::video_player::CompletionTicket;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Touch gestures and settings-dialog outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    LongPress,
    Tap,
    SettingsClosed,
    SettingsCancelled,
}

/// External storage host taking or releasing the media volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Ui(UiEvent),
    /// Slideshow interval elapsed.
    AutoAdvance,
    /// The playing video reached its end. Ignored once the ticket is stale.
    VideoCompleted(CompletionTicket),
    Files(FileEvent),
    Device(DeviceEvent),
    Shutdown,
}

/// Cloneable producer side of the dispatcher queues.
#[derive(Debug, Clone)]
pub struct EventSender {
    events: Sender<AppEvent>,
    devices: Sender<DeviceEvent>,
    files: FileEventSender,
}

impl EventSender {
    /// Posts `event` without blocking. Returns `false` if it was dropped.
    ///
    /// A full queue means the dispatcher is still busy with earlier input;
    /// timer ticks and gestures arriving then are not worth queueing.
    pub fn post(&self, event: AppEvent) -> bool {
        match self.events.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                log::warn!("Event queue full, dropping {event:?}");
                false
            }
            Err(TrySendError::Disconnected(event)) => {
                log::debug!("Dispatcher gone, dropping {event:?}");
                false
            }
        }
    }

    pub fn ui(&self, event: UiEvent) -> bool {
        self.post(AppEvent::Ui(event))
    }

    /// Posts a hot-plug event on its own queue, waiting for space.
    ///
    /// A lost `Disconnected` would leave the hold in place forever, so these
    /// are never dropped while the dispatcher is alive.
    pub fn device(&self, event: DeviceEvent) -> bool {
        match self.devices.send(event) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Dispatcher gone, dropping {:?}", e.into_inner());
                false
            }
        }
    }

    /// Posts a file notification on its own queue.
    pub fn file(&self, event: FileEvent) -> bool {
        self.files.notify(event)
    }

    #[must_use]
    pub fn files(&self) -> &FileEventSender {
        &self.files
    }

    /// Asks the dispatcher to exit, waiting for queue space if needed.
    pub fn shutdown(&self) {
        if self.events.send(AppEvent::Shutdown).is_err() {
            log::debug!("Dispatcher already stopped");
        }
    }
}

/// Consumer side, handed to [`Dispatcher::spawn`].
#[derive(Debug)]
pub struct EventReceivers {
    pub(crate) events: Receiver<AppEvent>,
    pub(crate) devices: Receiver<DeviceEvent>,
    pub(crate) files: Receiver<FileEvent>,
}

/// Creates the event queues with their default capacities.
#[must_use]
pub fn channels() -> (EventSender, EventReceivers) {
    channels_with_capacity(UI_EVENT_QUEUE_CAPACITY, FILE_EVENT_QUEUE_CAPACITY)
}

#[must_use]
pub fn channels_with_capacity(events: usize, files: usize) -> (EventSender, EventReceivers) {
    let (event_tx, event_rx) = bounded(events);
    let (device_tx, device_rx) = bounded(DEVICE_EVENT_QUEUE_CAPACITY);
    let (file_tx, file_rx) = files::queue(files);
    (
        EventSender {
            events: event_tx,
            devices: device_tx,
            files: file_tx,
        },
        EventReceivers {
            events: event_rx,
            devices: device_rx,
            files: file_rx,
        },
    )
}
