// SPDX-License-Identifier: MPL-2.0
//! Playback state machines.
//!
//! [`PlaybackState`] is the album-level view of what the frame is doing;
//! [`VideoState`] is the lifecycle of the video controller alone.

/// What the frame as a whole is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing loaded yet.
    #[default]
    Idle,
    LoadingImage,
    DisplayingImage,
    StartingVideo,
    PlayingVideo,
    PausedVideo,
    /// The last load failed.
    Error,
}

impl PlaybackState {
    #[must_use]
    pub fn is_video(self) -> bool {
        matches!(
            self,
            Self::StartingVideo | Self::PlayingVideo | Self::PausedVideo
        )
    }

    #[must_use]
    pub fn is_loading(self) -> bool {
        matches!(self, Self::LoadingImage | Self::StartingVideo)
    }
}

/// Lifecycle of the video playback controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoState {
    #[default]
    Stopped,
    Playing,
    Paused,
    /// A pipeline call failed; cleared by `stop` or a new `play`.
    Error,
}

impl VideoState {
    #[must_use]
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    #[must_use]
    pub fn is_paused(self) -> bool {
        matches!(self, Self::Paused)
    }

    #[must_use]
    pub fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Playing or paused: a pipeline session exists.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }

    /// States from which a fresh `play` is accepted.
    #[must_use]
    pub fn can_play(self) -> bool {
        matches!(self, Self::Stopped | Self::Error)
    }
}

/// Why the slideshow is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PauseReason {
    #[default]
    None,
    /// Touch input; clears itself after the idle timeout.
    UserInteraction,
    /// A host device owns the storage; only an explicit resume clears it.
    ExternalDeviceHold,
}

impl PauseReason {
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }

    #[must_use]
    pub fn auto_clears(self) -> bool {
        matches!(self, Self::UserInteraction)
    }
}

/// Which layer the presenter shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Image,
    Video,
}
