// SPDX-License-Identifier: MPL-2.0
//! The event loop.
//!
//! One thread receives from the event, device and file queues and runs each
//! handler to completion before taking the next event. Handler failures are
//! logged and the loop carries on; only [`AppEvent::Shutdown`] or dropping
//! every sender ends it. A video completion is acted on only while its
//! ticket is current.
//!
//! When slideshow and video disagree, the video wins: ticks are ignored
//! while a video is playing or paused, and closing the settings dialog does
//! not restart the slideshow over a video.

use super::{AppEvent, DeviceCoordinator, DeviceEvent, EventReceivers, FileEvent, UiEvent};
use crate::album::AlbumNavigator;
use crate::domain::playback::{PauseReason, VideoState};
use crate::error::{Error, Result};
use crate::video_player::CompletionTicket;
use crossbeam_channel::{never, select};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub struct Dispatcher {
    album: Arc<AlbumNavigator>,
    device: DeviceCoordinator,
}

impl Dispatcher {
    pub fn new(album: Arc<AlbumNavigator>) -> Self {
        let device = DeviceCoordinator::new(Arc::clone(&album));
        Self { album, device }
    }

    /// Moves the dispatcher onto its own thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(self, receivers: EventReceivers) -> std::io::Result<DispatcherHandle> {
        let thread = thread::Builder::new()
            .name("event-dispatch".into())
            .spawn(move || self.run(receivers))?;
        Ok(DispatcherHandle { thread })
    }

    fn run(mut self, receivers: EventReceivers) {
        log::debug!("Event dispatcher started");
        let EventReceivers {
            events,
            devices,
            files,
        } = receivers;
        let mut devices_open = true;
        let mut files_open = true;

        loop {
            // A closed side queue is swapped for one that never fires.
            let device_rx = if devices_open { devices.clone() } else { never() };
            let file_rx = if files_open { files.clone() } else { never() };

            let event = select! {
                recv(events) -> msg => match msg {
                    Ok(event) => event,
                    Err(_) => break,
                },
                recv(device_rx) -> msg => match msg {
                    Ok(event) => AppEvent::Device(event),
                    Err(_) => {
                        devices_open = false;
                        continue;
                    }
                },
                recv(file_rx) -> msg => match msg {
                    Ok(event) => AppEvent::Files(event),
                    Err(_) => {
                        files_open = false;
                        continue;
                    }
                },
            };

            if self.handle(event).is_break() {
                break;
            }
        }
        log::debug!("Event dispatcher stopped");
    }

    /// Runs the handler for one event.
    pub fn handle(&mut self, event: AppEvent) -> ControlFlow<()> {
        log::trace!("Dispatching {event:?}");
        let result = match &event {
            AppEvent::Ui(ui) => self.on_ui(*ui),
            AppEvent::AutoAdvance => self.on_auto_advance(),
            AppEvent::VideoCompleted(ticket) => self.on_video_completed(*ticket),
            AppEvent::Files(file) => self.on_files(file),
            AppEvent::Device(device) => {
                self.on_device(*device);
                Ok(())
            }
            AppEvent::Shutdown => return ControlFlow::Break(()),
        };
        if let Err(e) = result {
            log::warn!("Handling {event:?} failed: {e}");
        }
        ControlFlow::Continue(())
    }

    fn on_ui(&self, event: UiEvent) -> Result<()> {
        let slideshow = self.album.slideshow();
        let video = self.album.video();
        let presenter = self.album.presenter();

        match event {
            UiEvent::SwipeLeft | UiEvent::SwipeRight => {
                match slideshow.manual_trigger() {
                    Ok(()) | Err(Error::InvalidState(_)) => {}
                    Err(e) => return Err(e),
                }
                if event == UiEvent::SwipeLeft {
                    self.album.next()
                } else {
                    self.album.prev()
                }
            }
            UiEvent::SwipeUp | UiEvent::SwipeDown => {
                if self.album.current_is_video() {
                    let volume = if event == UiEvent::SwipeUp {
                        video.volume_up()
                    } else {
                        video.volume_down()
                    };
                    presenter.show_volume(volume);
                }
                Ok(())
            }
            UiEvent::LongPress => {
                presenter.show_settings(slideshow.interval());
                slideshow.stop();
                Ok(())
            }
            UiEvent::Tap => {
                if !self.album.current_is_video() {
                    return Ok(());
                }
                match video.state() {
                    VideoState::Playing => {
                        video.pause()?;
                        slideshow.pause();
                        Ok(())
                    }
                    VideoState::Paused => video.resume(),
                    VideoState::Stopped | VideoState::Error => Ok(()),
                }
            }
            UiEvent::SettingsClosed => {
                let selected = presenter.selected_interval();
                if selected != slideshow.interval() {
                    self.album.set_interval(selected);
                    log::info!("Slideshow interval set to {selected:?}");
                }
                presenter.hide_settings();
                self.restart_after_settings();
                Ok(())
            }
            UiEvent::SettingsCancelled => {
                presenter.hide_settings();
                self.restart_after_settings();
                Ok(())
            }
        }
    }

    fn restart_after_settings(&self) {
        if self.album.video().state().is_active() {
            return;
        }
        if self.album.pause_reason() == PauseReason::ExternalDeviceHold {
            return;
        }
        self.album.slideshow().start();
    }

    fn on_auto_advance(&self) -> Result<()> {
        if self.album.video().state().is_active() {
            log::debug!("Ignoring slideshow tick during video playback");
            return Ok(());
        }
        self.album.next()
    }

    fn on_video_completed(&self, ticket: CompletionTicket) -> Result<()> {
        if !self.album.video().is_current_completion(ticket) {
            log::debug!("Ignoring completion of a video that was since paused or left");
            return Ok(());
        }
        log::debug!("Video completed, advancing");
        self.album.slideshow().start();
        self.album.next()
    }

    fn on_files(&self, event: &FileEvent) -> Result<()> {
        log::info!("Media directory changed ({event:?}), rescanning");
        self.album.refresh()
    }

    fn on_device(&mut self, event: DeviceEvent) {
        self.device.handle(event);
    }
}

/// Join handle of the dispatcher thread.
#[derive(Debug)]
pub struct DispatcherHandle {
    thread: JoinHandle<()>,
}

impl DispatcherHandle {
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }

    /// Waits for the dispatcher to exit.
    pub fn join(self) {
        if self.thread.join().is_err() {
            log::error!("Event dispatcher panicked");
        }
    }
}
