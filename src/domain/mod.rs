// SPDX-License-Identifier: MPL-2.0
//! Domain layer - value types and state machines shared by the services.
//!
//! # Modules
//!
//! - [`media`]: Collection and image types ([`MediaEntry`](media::MediaEntry),
//!   [`MediaCollection`](media::MediaCollection), [`ProcessPlan`](media::ProcessPlan))
//! - [`playback`]: Playback states ([`PlaybackState`](playback::PlaybackState),
//!   [`VideoState`](playback::VideoState), [`PauseReason`](playback::PauseReason))
//! - [`volume`]: Clamped newtypes ([`Volume`](volume::Volume),
//!   [`SlideInterval`](volume::SlideInterval))

pub mod media;
pub mod playback;
pub mod volume;
