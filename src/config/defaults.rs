// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Slideshow**: Auto-advance period and idle-resume timeout
//! - **Image Files**: Size bounds accepted before decode
//! - **Decode Envelope**: Maximum resolution and pixel format
//! - **Video**: Completion margin and cancellation bounds
//! - **Volume**: Audio volume range and step
//! - **Collection / Events**: Capacity limits

// ==========================================================================
// Slideshow Defaults
// ==========================================================================

/// Default auto-advance period (milliseconds).
pub const DEFAULT_SLIDESHOW_INTERVAL_MS: u64 = 5_000;

/// Shortest period selectable in settings (milliseconds).
pub const MIN_SLIDESHOW_INTERVAL_MS: u64 = 2_000;

/// Longest period selectable in settings (milliseconds).
pub const MAX_SLIDESHOW_INTERVAL_MS: u64 = 60_000;

/// Interval choices offered by the settings panel (seconds).
pub const SLIDESHOW_INTERVAL_OPTIONS_SECS: [u64; 7] = [2, 3, 5, 10, 15, 30, 60];

/// Delay after a manual pause before the slideshow resumes on its own.
pub const DEFAULT_IDLE_RESUME_TIMEOUT_MS: u64 = 3_000;

// ==========================================================================
// Image File Defaults
// ==========================================================================

/// Files smaller than this cannot hold a valid image.
pub const MIN_IMAGE_FILE_BYTES: u64 = 100;

/// Files larger than this are rejected as suspicious before decode.
pub const MAX_IMAGE_FILE_BYTES: u64 = 10 * 1024 * 1024;

// ==========================================================================
// Decode Envelope
// ==========================================================================

/// Maximum decodable width (1080p).
pub const MAX_DECODE_WIDTH: u32 = 1920;

/// Maximum decodable height (1080p).
pub const MAX_DECODE_HEIGHT: u32 = 1080;

/// Output pixel format is RGB565.
pub const BYTES_PER_PIXEL: usize = 2;

/// Size of one video decode buffer (worst-case frame).
pub const VIDEO_BUFFER_BYTES: usize =
    MAX_DECODE_WIDTH as usize * MAX_DECODE_HEIGHT as usize * BYTES_PER_PIXEL;

/// Number of rotating video decode buffers.
pub const DECODE_BUFFER_COUNT: usize = 2;

/// Default display width.
pub const DEFAULT_DISPLAY_WIDTH: u32 = 1024;

/// Default display height.
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 600;

// ==========================================================================
// Video Defaults
// ==========================================================================

/// Added to the container duration before the completion timer fires.
pub const DEFAULT_COMPLETION_MARGIN_MS: u64 = 500;

/// Bound on waiting for the extraction worker to acknowledge a stop.
pub const STOP_ACK_TIMEOUT_MS: u64 = 1_000;

/// Bound on acquiring the frame lock; frames are dropped past it.
pub const FRAME_LOCK_TIMEOUT_MS: u64 = 100;

/// Bound on acquiring the shared decode engine.
pub const ENGINE_LOCK_TIMEOUT_MS: u64 = 1_000;

/// Pause between stop and play when restarting the current video.
pub const RESTART_SETTLE_MS: u64 = 100;

/// Capacity of the extraction command queue.
pub const EXTRACTION_COMMAND_CAPACITY: usize = 8;

// ==========================================================================
// Volume Defaults
// ==========================================================================

/// Default audio volume (percent).
pub const DEFAULT_VOLUME: u8 = 50;

/// Minimum volume level.
pub const MIN_VOLUME: u8 = 0;

/// Maximum volume level.
pub const MAX_VOLUME: u8 = 100;

/// Volume adjustment per swipe.
pub const VOLUME_STEP: u8 = 10;

// ==========================================================================
// Collection / Event Defaults
// ==========================================================================

/// Upper bound on entries kept from one scan.
pub const MAX_MEDIA_FILES: usize = 1_000;

/// File-change notifications beyond this many pending are dropped.
pub const FILE_EVENT_QUEUE_CAPACITY: usize = 8;

/// Capacity of the UI and system event queue.
pub const UI_EVENT_QUEUE_CAPACITY: usize = 32;

/// Device hot-plug events wait for space instead of being dropped.
pub const DEVICE_EVENT_QUEUE_CAPACITY: usize = 4;

/// Progress is shown 1-based ("3 / 12").
pub const PROGRESS_INDEX_OFFSET: usize = 1;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Slideshow validation
    assert!(MIN_SLIDESHOW_INTERVAL_MS > 0);
    assert!(MAX_SLIDESHOW_INTERVAL_MS >= MIN_SLIDESHOW_INTERVAL_MS);
    assert!(DEFAULT_SLIDESHOW_INTERVAL_MS >= MIN_SLIDESHOW_INTERVAL_MS);
    assert!(DEFAULT_SLIDESHOW_INTERVAL_MS <= MAX_SLIDESHOW_INTERVAL_MS);
    assert!(DEFAULT_IDLE_RESUME_TIMEOUT_MS > 0);

    // Image file validation
    assert!(MIN_IMAGE_FILE_BYTES < MAX_IMAGE_FILE_BYTES);

    // Decode envelope validation
    assert!(DECODE_BUFFER_COUNT == 2);
    assert!(DEFAULT_DISPLAY_WIDTH <= MAX_DECODE_WIDTH);
    assert!(DEFAULT_DISPLAY_HEIGHT <= MAX_DECODE_HEIGHT);

    // Video validation
    assert!(FRAME_LOCK_TIMEOUT_MS < STOP_ACK_TIMEOUT_MS);
    assert!(EXTRACTION_COMMAND_CAPACITY > 0);

    // Volume validation
    assert!(MAX_VOLUME > MIN_VOLUME);
    assert!(DEFAULT_VOLUME >= MIN_VOLUME);
    assert!(DEFAULT_VOLUME <= MAX_VOLUME);
    assert!(VOLUME_STEP > 0);

    // Event validation
    assert!(FILE_EVENT_QUEUE_CAPACITY > 0);
    assert!(UI_EVENT_QUEUE_CAPACITY > 0);
    assert!(DEVICE_EVENT_QUEUE_CAPACITY > 0);
};
