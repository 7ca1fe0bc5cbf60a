// SPDX-License-Identifier: MPL-2.0
//! Application root: builds the service graph and runs the event loop.
//!
//! The slideshow timer and the video completion timer never call into the
//! album directly. They post [`AppEvent`]s, so every album operation runs on
//! the dispatcher thread.

use crate::album::{AlbumCollaborators, AlbumConfig, AlbumNavigator};
use crate::application::port::{
    AudioSink, ContainerExtractor, DecodeEngine, ImageDecoder, ImageProcessor, MediaEnumerator,
    Presenter,
};
use crate::config::Config;
use crate::domain::media::ImageInfo;
use crate::error::{Error, Result};
use crate::events::{self, AppEvent, Dispatcher, DispatcherHandle, EventReceivers, EventSender};
use crate::infrastructure::{self, FsScanner, ImageRsDecoder, LogPresenter, SoftwareProcessor};
use crate::slideshow::SlideshowTimer;
use crate::video_player::{ControllerConfig, SharedEngine, VideoCollaborators, VideoController};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Collaborators the application is assembled from.
pub struct AppParts {
    pub enumerator: Arc<dyn MediaEnumerator>,
    pub decoder: Arc<dyn ImageDecoder>,
    pub processor: Arc<dyn ImageProcessor>,
    pub presenter: Arc<dyn Presenter>,
    pub engine: Arc<dyn DecodeEngine>,
    pub extractor: Box<dyn ContainerExtractor>,
    pub audio: Option<Arc<dyn AudioSink>>,
}

impl AppParts {
    /// Software adapters: filesystem scan, `image` decode, log output.
    #[must_use]
    pub fn software(config: &Config) -> Self {
        let decoder = Arc::new(ImageRsDecoder);
        Self {
            enumerator: Arc::new(FsScanner::new(config.scan.sort_order, config.scan.max_files)),
            decoder: decoder.clone(),
            processor: Arc::new(SoftwareProcessor::default()),
            presenter: Arc::new(LogPresenter::new(config.slide_interval().as_duration())),
            engine: decoder,
            extractor: infrastructure::default_extractor(),
            audio: None,
        }
    }
}

pub struct App {
    album: Arc<AlbumNavigator>,
    sender: EventSender,
    receivers: Option<EventReceivers>,
    dispatcher: Option<DispatcherHandle>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("album", &self.album)
            .field("dispatching", &self.dispatcher.is_some())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Wires the album, slideshow and video controller together.
    ///
    /// Timers are spawned on `runtime`.
    pub fn new(config: &Config, parts: AppParts, runtime: Handle) -> Self {
        let (sender, receivers) = events::channels();

        let ticks = sender.clone();
        let slideshow = SlideshowTimer::new(
            runtime.clone(),
            config.slide_interval().as_duration(),
            config.idle_timeout(),
            Arc::new(move || {
                ticks.post(AppEvent::AutoAdvance);
            }),
        );

        let engine = SharedEngine::new(parts.engine);
        let completions = sender.clone();
        let video = Arc::new(VideoController::new(
            VideoCollaborators {
                extractor: parts.extractor,
                engine: engine.clone(),
                presenter: Arc::clone(&parts.presenter),
                audio: parts.audio,
            },
            slideshow.clone(),
            runtime,
            Arc::new(move |ticket| {
                completions.post(AppEvent::VideoCompleted(ticket));
            }),
            ControllerConfig {
                completion_margin: config.completion_margin(),
                initial_volume: config.volume(),
                ..ControllerConfig::default()
            },
        ));

        let mut album_config = AlbumConfig::new(config.media_dir());
        album_config.display = ImageInfo::new(config.display.width, config.display.height);
        let album = Arc::new(AlbumNavigator::new(
            AlbumCollaborators {
                enumerator: parts.enumerator,
                decoder: parts.decoder,
                processor: parts.processor,
                presenter: parts.presenter,
                engine,
            },
            slideshow,
            video,
            album_config,
        ));

        Self {
            album,
            sender,
            receivers: Some(receivers),
            dispatcher: None,
        }
    }

    /// Shows the first entry and starts dispatching events.
    ///
    /// An empty or unplayable directory is not fatal: the frame waits for
    /// file events.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if already started, scan errors, or a failure
    /// to spawn the dispatcher thread.
    pub fn start(&mut self) -> Result<()> {
        let receivers = self
            .receivers
            .take()
            .ok_or_else(|| Error::InvalidState("application already started".into()))?;

        match self.album.start() {
            Ok(()) => {}
            Err(Error::NotFound(msg)) => log::warn!("Nothing to show yet: {msg}"),
            Err(e) => return Err(e),
        }

        let handle = Dispatcher::new(Arc::clone(&self.album)).spawn(receivers)?;
        self.dispatcher = Some(handle);
        log::info!("Slideframe running");
        Ok(())
    }

    #[must_use]
    pub fn album(&self) -> &Arc<AlbumNavigator> {
        &self.album
    }

    /// Producer handle for input sources.
    #[must_use]
    pub fn events(&self) -> EventSender {
        self.sender.clone()
    }

    /// Blocks until the dispatcher exits.
    pub fn wait(&mut self) {
        if let Some(handle) = self.dispatcher.take() {
            handle.join();
        }
    }

    /// Stops the dispatcher, playback and timers.
    pub fn shutdown(&mut self) {
        self.sender.shutdown();
        self.wait();
        if let Err(e) = self.album.video().stop() {
            log::warn!("Failed to stop video on shutdown: {e}");
        }
        self.album.slideshow().stop();
        log::info!("Slideframe stopped");
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if self.dispatcher.is_some() {
            self.shutdown();
        }
    }
}
