// SPDX-License-Identifier: MPL-2.0
//! Album: the scanned media directory and the entry currently on screen.

pub mod arena;
pub mod navigator;

pub use arena::DecodeArena;
pub use navigator::{AlbumCollaborators, AlbumConfig, AlbumNavigator};
