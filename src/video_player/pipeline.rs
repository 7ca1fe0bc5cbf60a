// SPDX-License-Identifier: MPL-2.0
//! Background frame extraction.
//!
//! Each playback session runs one worker thread that pulls compressed frames
//! from the [`ContainerExtractor`], decodes them into the rotating
//! [`DecodeBuffers`] and hands each decoded frame to the frame sink.
//!
//! # Protocol
//!
//! The worker is driven over a bounded command queue:
//!
//! - it blocks until `Start` (or `Stop`) arrives;
//! - while running it drains the queue without blocking between frames, so
//!   pause and stop latency is bounded by one frame read;
//! - while paused it blocks on the queue and does no work;
//! - on `Stop`, end of stream or a read error it sends `StoppedAck` and exits.
//!
//! `stop` waits for the acknowledgement with a bounded timeout. When the
//! worker does not answer in time it is abandoned: the thread is detached,
//! flagged so it never touches shared state again, and the frame stage it
//! may still hold is replaced with a fresh one.

use super::buffers::DecodeBuffers;
use super::engine::{EngineLease, SharedEngine};
use crate::application::port::{ContainerExtractor, ContainerFrame};
use crate::config::{
    ENGINE_LOCK_TIMEOUT_MS, EXTRACTION_COMMAND_CAPACITY, FRAME_LOCK_TIMEOUT_MS,
    STOP_ACK_TIMEOUT_MS, VIDEO_BUFFER_BYTES,
};
use crate::domain::media::{VideoFrame, VideoInfo};
use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Receives every decoded frame on the extraction thread.
///
/// Runs while the frame lock is held; the borrowed pixels are only valid for
/// the duration of the call.
pub type FrameSink = Arc<dyn Fn(&VideoFrame<'_>) + Send + Sync>;

/// Shared handle to the session's container extractor.
pub type SharedExtractor = Arc<Mutex<Box<dyn ContainerExtractor>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Stop,
    Pause,
    Resume,
}

/// Sent by the worker once it has left its loop.
#[derive(Debug)]
struct StoppedAck;

/// Timing and sizing knobs.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Size of each decode buffer.
    pub buffer_bytes: usize,
    /// Bound on waiting for the stop acknowledgement and for the extractor.
    pub stop_timeout: Duration,
    /// Bound on waiting for the frame lock before dropping a frame.
    pub frame_lock_timeout: Duration,
    pub engine_timeout: Duration,
    pub command_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_bytes: VIDEO_BUFFER_BYTES,
            stop_timeout: Duration::from_millis(STOP_ACK_TIMEOUT_MS),
            frame_lock_timeout: Duration::from_millis(FRAME_LOCK_TIMEOUT_MS),
            engine_timeout: Duration::from_millis(ENGINE_LOCK_TIMEOUT_MS),
            command_capacity: EXTRACTION_COMMAND_CAPACITY,
        }
    }
}

/// Counters for the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames_decoded: u64,
    pub frames_dropped: u64,
    /// Zero until the first frame decodes.
    pub width: u32,
    pub height: u32,
}

/// Copy of the most recently decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub index: u64,
    pub slot: usize,
}

#[derive(Debug, Clone, Copy)]
struct LatestFrame {
    slot: usize,
    len: usize,
    index: u64,
}

#[derive(Debug)]
struct FrameSlots {
    buffers: DecodeBuffers,
    latest: Option<LatestFrame>,
}

/// The buffer pair behind its lock, plus counters readable without it.
#[derive(Debug)]
struct FrameStage {
    frames: Mutex<FrameSlots>,
    /// Index of the next decoded frame, monotonic for the whole session.
    next_index: AtomicU64,
    decoded: AtomicU64,
    dropped: AtomicU64,
    width: AtomicU32,
    height: AtomicU32,
}

impl FrameStage {
    fn new(buffer_bytes: usize) -> Self {
        Self {
            frames: Mutex::new(FrameSlots {
                buffers: DecodeBuffers::new(buffer_bytes),
                latest: None,
            }),
            next_index: AtomicU64::new(0),
            decoded: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            width: AtomicU32::new(0),
            height: AtomicU32::new(0),
        }
    }

    fn reset_counters(&self) {
        self.next_index.store(0, Ordering::Relaxed);
        self.decoded.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.width.store(0, Ordering::Relaxed);
        self.height.store(0, Ordering::Relaxed);
    }

    fn drop_frame(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    fn stats(&self) -> PipelineStats {
        PipelineStats {
            frames_decoded: self.decoded.load(Ordering::Relaxed),
            frames_dropped: self.dropped.load(Ordering::Relaxed),
            width: self.width.load(Ordering::Relaxed),
            height: self.height.load(Ordering::Relaxed),
        }
    }
}

struct Session {
    commands: Sender<Command>,
    acks: Receiver<StoppedAck>,
    abandoned: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Session {
    fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

/// Double-buffered extraction pipeline.
pub struct ExtractionPipeline {
    extractor: SharedExtractor,
    engine: SharedEngine,
    sink: FrameSink,
    config: PipelineConfig,
    stage: Arc<FrameStage>,
    lease: Option<Arc<EngineLease>>,
    session: Option<Session>,
    info: Option<VideoInfo>,
    paused: bool,
}

impl std::fmt::Debug for ExtractionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionPipeline")
            .field("config", &self.config)
            .field("info", &self.info)
            .field("running", &self.is_running())
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

impl ExtractionPipeline {
    /// Allocates the buffer pair. No thread runs until [`start`](Self::start).
    pub fn new(
        extractor: Box<dyn ContainerExtractor>,
        engine: SharedEngine,
        sink: FrameSink,
        config: PipelineConfig,
    ) -> Self {
        Self {
            extractor: Arc::new(Mutex::new(extractor)),
            engine,
            sink,
            stage: Arc::new(FrameStage::new(config.buffer_bytes)),
            config,
            lease: None,
            session: None,
            info: None,
            paused: false,
        }
    }

    /// Opens `path` and starts extracting.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if a session is already active
    /// - [`Error::Timeout`] if an abandoned worker still holds the extractor
    /// - [`Error::NotFound`] if the container has no video stream
    /// - the extractor's or engine's error otherwise
    ///
    /// On error no worker is left running.
    pub fn start(&mut self, path: &Path, want_audio: bool) -> Result<VideoInfo> {
        if self.session.is_some() {
            return Err(Error::InvalidState("extraction already running".into()));
        }

        let info = {
            let mut extractor = self.lock_extractor()?;
            extractor.start(path, true, want_audio)?;
            match extractor.video_info() {
                Some(info) => info,
                None => {
                    extractor.stop();
                    return Err(Error::NotFound(format!(
                        "no video stream in {}",
                        path.display()
                    )));
                }
            }
        };

        let lease = match self.engine.acquire(self.config.engine_timeout) {
            Ok(lease) => Arc::new(lease),
            Err(e) => {
                self.stop_extractor(self.stop_deadline());
                return Err(e);
            }
        };

        self.stage.reset_counters();
        if let Some(mut frames) = self.stage.frames.try_lock_for(self.config.frame_lock_timeout) {
            frames.buffers.reset();
            frames.latest = None;
        }

        if let Err(e) = self.spawn_worker(Arc::clone(&lease)) {
            self.stop_extractor(self.stop_deadline());
            return Err(e);
        }

        self.lease = Some(lease);
        self.info = Some(info);
        self.paused = false;
        log::debug!(
            "Extraction started: {} ({}x{}, {} ms)",
            path.display(),
            info.width,
            info.height,
            info.duration_ms
        );
        Ok(info)
    }

    /// Stops the worker and closes the container.
    ///
    /// The acknowledgement wait and the extractor lock share one deadline,
    /// so this completes within the stop timeout even if the worker hangs.
    /// Stopping an idle pipeline is a no-op.
    ///
    /// # Errors
    ///
    /// Currently always succeeds; a hung worker is logged and abandoned.
    pub fn stop(&mut self) -> Result<()> {
        let deadline = self.stop_deadline();
        let had_session = self.session.is_some();
        self.halt_worker(deadline);
        if had_session || self.info.is_some() {
            self.stop_extractor(deadline);
        }
        self.lease = None;
        self.info = None;
        self.paused = false;
        Ok(())
    }

    /// Holds frame delivery until [`resume`](Self::resume).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] without an active session, [`Error::Timeout`]
    /// if the command queue stays full.
    pub fn pause(&mut self) -> Result<()> {
        self.send(Command::Pause)?;
        self.paused = true;
        Ok(())
    }

    /// # Errors
    ///
    /// Same as [`pause`](Self::pause).
    pub fn resume(&mut self) -> Result<()> {
        self.send(Command::Resume)?;
        self.paused = false;
        Ok(())
    }

    /// Repositions playback. The worker is stopped around the seek and
    /// restarted afterwards, keeping its paused state.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] before a successful start, [`Error::Timeout`]
    /// if the extractor stays locked, or the extractor's seek error.
    pub fn seek(&mut self, position_ms: u64) -> Result<()> {
        let lease = self
            .lease
            .clone()
            .ok_or_else(|| Error::InvalidState("seek before start".into()))?;
        let was_paused = self.paused;

        self.halt_worker(self.stop_deadline());
        self.lock_extractor()?.seek(position_ms)?;
        self.spawn_worker(lease)?;
        if was_paused {
            self.pause()?;
        }
        log::debug!("Extraction seeked to {position_ms} ms");
        Ok(())
    }

    /// Stream properties of the current session.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] before a successful start.
    pub fn info(&self) -> Result<VideoInfo> {
        self.info
            .ok_or_else(|| Error::NotFound("no video session".into()))
    }

    /// True while a worker thread is alive for this session.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.is_finished())
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.stage.stats()
    }

    /// Copies the newest decoded frame.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if the worker holds the frame lock too long.
    pub fn latest_frame(&self) -> Result<Option<OwnedFrame>> {
        let frames = self
            .stage
            .frames
            .try_lock_for(self.config.frame_lock_timeout)
            .ok_or_else(|| Error::Timeout("frame lock".into()))?;
        let stats = self.stage.stats();
        Ok(frames.latest.map(|latest| OwnedFrame {
            data: frames.buffers.slot(latest.slot)[..latest.len].to_vec(),
            width: stats.width,
            height: stats.height,
            index: latest.index,
            slot: latest.slot,
        }))
    }

    fn lock_extractor(
        &self,
    ) -> Result<parking_lot::MutexGuard<'_, Box<dyn ContainerExtractor>>> {
        self.extractor
            .try_lock_for(self.config.stop_timeout)
            .ok_or_else(|| Error::Timeout("container extractor is busy".into()))
    }

    fn stop_deadline(&self) -> Instant {
        Instant::now() + self.config.stop_timeout
    }

    fn stop_extractor(&self, deadline: Instant) {
        match self.extractor.try_lock_until(deadline) {
            Some(mut extractor) => extractor.stop(),
            None => log::warn!("Container extractor still busy; leaving it open"),
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| Error::InvalidState(format!("{command:?} without a session")))?;
        match session.commands.send_timeout(command, self.config.stop_timeout) {
            Ok(()) => Ok(()),
            // The worker already left on its own (end of stream); nothing to
            // pause or resume.
            Err(crossbeam_channel::SendTimeoutError::Disconnected(_)) => {
                log::debug!("{command:?} ignored: extraction worker has exited");
                Ok(())
            }
            Err(crossbeam_channel::SendTimeoutError::Timeout(_)) => {
                Err(Error::Timeout(format!("{command:?} command queue full")))
            }
        }
    }

    fn spawn_worker(&mut self, lease: Arc<EngineLease>) -> Result<()> {
        let (command_tx, command_rx) = crossbeam_channel::bounded(self.config.command_capacity);
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        let abandoned = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            commands: command_rx,
            acks: ack_tx,
            extractor: Arc::clone(&self.extractor),
            stage: Arc::clone(&self.stage),
            lease,
            sink: Arc::clone(&self.sink),
            abandoned: Arc::clone(&abandoned),
            extractor_timeout: self.config.stop_timeout,
            frame_lock_timeout: self.config.frame_lock_timeout,
            paused: false,
        };

        let thread = std::thread::Builder::new()
            .name("frame-extract".into())
            .spawn(move || worker.run())
            .map_err(|e| Error::ResourceExhausted(format!("cannot spawn extraction thread: {e}")))?;

        command_tx
            .send(Command::Start)
            .map_err(|_| Error::Internal("extraction worker exited before start".into()))?;

        self.session = Some(Session {
            commands: command_tx,
            acks: ack_rx,
            abandoned,
            thread: Some(thread),
        });
        Ok(())
    }

    /// Stops the worker thread, abandoning it if it does not acknowledge.
    fn halt_worker(&mut self, deadline: Instant) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        // A full queue or an exited worker both end in the ack wait below.
        let _ = session.commands.try_send(Command::Stop);

        match session.acks.recv_deadline(deadline) {
            Ok(StoppedAck) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(thread) = session.thread.take() {
                    if thread.join().is_err() {
                        log::error!("Extraction worker panicked");
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "Extraction worker did not stop within {:?}; abandoning it",
                    self.config.stop_timeout
                );
                session.abandoned.store(true, Ordering::SeqCst);
                // Dropping the handle detaches the thread.
                drop(session.thread.take());
                let stage = FrameStage::new(self.config.buffer_bytes);
                stage
                    .next_index
                    .store(self.stage.next_index.load(Ordering::Relaxed), Ordering::Relaxed);
                self.stage = Arc::new(stage);
            }
        }
    }
}

impl Drop for ExtractionPipeline {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// State owned by the extraction thread.
struct Worker {
    commands: Receiver<Command>,
    acks: Sender<StoppedAck>,
    extractor: SharedExtractor,
    stage: Arc<FrameStage>,
    lease: Arc<EngineLease>,
    sink: FrameSink,
    abandoned: Arc<AtomicBool>,
    extractor_timeout: Duration,
    frame_lock_timeout: Duration,
    paused: bool,
}

impl Worker {
    fn run(mut self) {
        if self.wait_for_start() == Flow::Continue {
            self.extract();
        }
        let _ = self.acks.try_send(StoppedAck);
    }

    fn wait_for_start(&mut self) -> Flow {
        loop {
            match self.commands.recv() {
                Ok(Command::Start) => return Flow::Continue,
                Ok(Command::Stop) | Err(_) => return Flow::Stop,
                Ok(Command::Pause | Command::Resume) => {}
            }
        }
    }

    fn extract(&mut self) {
        loop {
            if self.poll_commands() == Flow::Stop || self.is_abandoned() {
                return;
            }
            match self.read_one() {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => {
                    log::debug!("Extraction reached end of stream");
                    return;
                }
                Err(e) => {
                    if !self.is_abandoned() {
                        log::warn!("Extraction stopped: {e}");
                    }
                    return;
                }
            }
        }
    }

    /// Drains pending commands. Blocks only while paused.
    fn poll_commands(&mut self) -> Flow {
        loop {
            let command = if self.paused {
                match self.commands.recv() {
                    Ok(command) => command,
                    Err(_) => return Flow::Stop,
                }
            } else {
                match self.commands.try_recv() {
                    Ok(command) => command,
                    Err(TryRecvError::Empty) => return Flow::Continue,
                    Err(TryRecvError::Disconnected) => return Flow::Stop,
                }
            };

            match command {
                Command::Stop => return Flow::Stop,
                Command::Pause => self.paused = true,
                Command::Resume => self.paused = false,
                Command::Start => {}
            }
        }
    }

    fn read_one(&mut self) -> Result<Flow> {
        let frame = {
            let mut extractor = self
                .extractor
                .try_lock_for(self.extractor_timeout)
                .ok_or_else(|| Error::Timeout("container extractor is busy".into()))?;
            extractor.read_frame()?
        };

        if self.is_abandoned() {
            return Ok(Flow::Stop);
        }

        match frame {
            ContainerFrame::Video(compressed) => {
                self.deliver(&compressed);
                Ok(Flow::Continue)
            }
            ContainerFrame::Audio => Ok(Flow::Continue),
            ContainerFrame::EndOfStream => Ok(Flow::Stop),
        }
    }

    /// Decodes one frame into the next buffer and hands it to the sink.
    fn deliver(&mut self, compressed: &[u8]) {
        let stage = Arc::clone(&self.stage);

        let Some(mut guard) = stage.frames.try_lock_for(self.frame_lock_timeout) else {
            stage.drop_frame();
            log::debug!("Frame dropped: frame lock busy");
            return;
        };
        let frames = &mut *guard;

        if compressed.len() > frames.buffers.capacity() {
            stage.drop_frame();
            log::warn!(
                "Frame dropped: {} compressed bytes exceed the {} byte buffer",
                compressed.len(),
                frames.buffers.capacity()
            );
            return;
        }

        if stage.width.load(Ordering::Relaxed) == 0 {
            match self.lease.frame_info(compressed) {
                Ok(info) => {
                    stage.width.store(info.width, Ordering::Relaxed);
                    stage.height.store(info.height, Ordering::Relaxed);
                }
                Err(e) => {
                    stage.drop_frame();
                    log::debug!("Frame dropped: {e}");
                    return;
                }
            }
        }

        let slot = frames.buffers.next_slot();
        let len = match self
            .lease
            .decode_into(compressed, frames.buffers.slot_mut(slot))
        {
            Ok(len) => len,
            Err(e) => {
                stage.drop_frame();
                log::debug!("Frame dropped: {e}");
                return;
            }
        };
        frames.buffers.commit(slot);

        let index = stage.next_index.fetch_add(1, Ordering::Relaxed);
        stage.decoded.fetch_add(1, Ordering::Relaxed);
        frames.latest = Some(LatestFrame { slot, len, index });

        let frame = VideoFrame {
            data: &frames.buffers.slot(slot)[..len],
            width: stage.width.load(Ordering::Relaxed),
            height: stage.height.load(Ordering::Relaxed),
            index,
            slot,
        };
        (self.sink)(&frame);
    }

    fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }
}
