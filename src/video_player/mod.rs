// SPDX-License-Identifier: MPL-2.0
//! Video playback for MJPEG containers.
//!
//! The [`VideoController`] owns one [`ExtractionPipeline`] whose worker
//! thread pulls compressed frames from a container extractor and decodes
//! them on the shared hardware engine into a pair of rotating buffers.

pub mod buffers;
pub mod controller;
pub mod engine;
pub mod pipeline;

pub use buffers::DecodeBuffers;
pub use controller::{
    CompletionFn, CompletionTicket, ControllerConfig, VideoCollaborators, VideoController,
};
pub use engine::{EngineLease, SharedEngine};
pub use pipeline::{ExtractionPipeline, FrameSink, OwnedFrame, PipelineConfig, PipelineStats};
