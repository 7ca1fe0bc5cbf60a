// SPDX-License-Identifier: MPL-2.0
//! Error taxonomy shared by every service in the crate.
//!
//! Per-file decode failures are recovered locally by the album's retry-skip
//! policy; everything else propagates to the caller as the operation result.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Bad index, path or parameter.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation issued before initialisation, after teardown, or from the
    /// wrong playback state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// No playable media after exhausting retries, or a missing file.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Allocation failure or oversized input.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Format or resolution outside the decode envelope.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A bounded wait (lock or acknowledgement) expired.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Hardware or codec failure.
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Classifies a free-form codec or container message.
    ///
    /// Adapters wrapping native libraries only get strings back; this maps
    /// them onto the taxonomy so callers can branch on the variant.
    pub fn from_codec_message(msg: &str) -> Self {
        let lower = msg.to_lowercase();

        if lower.contains("no such file") || lower.contains("does not exist") {
            return Error::NotFound(msg.to_string());
        }

        // Codec errors first: "decoder not found" is an unsupported codec,
        // not a missing file.
        if lower.contains("codec") || lower.contains("decoder") || lower.contains("unsupported") {
            return Error::Unsupported(msg.to_string());
        }

        if lower.contains("not found") || lower.contains("no video stream") {
            return Error::NotFound(msg.to_string());
        }

        if lower.contains("out of memory")
            || lower.contains("cannot allocate")
            || lower.contains("too large")
        {
            return Error::ResourceExhausted(msg.to_string());
        }

        Error::Internal(msg.to_string())
    }

    /// Short, stable name of the variant for log lines.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "invalid-argument",
            Error::InvalidState(_) => "invalid-state",
            Error::NotFound(_) => "not-found",
            Error::ResourceExhausted(_) => "resource-exhausted",
            Error::Unsupported(_) => "unsupported",
            Error::Timeout(_) => "timeout",
            Error::Internal(_) => "internal",
            Error::Io(_) => "io",
            Error::Config(_) => "config",
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(err.to_string()),
            _ => Error::Io(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
