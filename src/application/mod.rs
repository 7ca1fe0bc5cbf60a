// SPDX-License-Identifier: MPL-2.0
//! Application layer - collaborator contracts.
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Infrastructure layer implements application layer ports
//! - The playback services (`album`, `slideshow`, `video_player`, `events`)
//!   only ever hold `dyn` port objects

pub mod port;
