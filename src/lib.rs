// SPDX-License-Identifier: MPL-2.0
//! `slideframe` drives a digital picture and video frame.
//!
//! It cycles through a directory of images and videos, auto-advancing on a
//! timer, reacting to touch gestures, and handing video entries to a
//! background frame-extraction pipeline. Decoding, presentation and
//! container parsing are consumed through the traits in
//! [`application::port`].

#![doc(html_root_url = "https://docs.rs/slideframe/0.1.0")]

pub mod album;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod infrastructure;
pub mod slideshow;
pub mod video_player;

#[cfg(test)]
pub(crate) mod test_utils;
