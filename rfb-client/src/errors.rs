//! Error types for the RFB client.

use rfb_common::ColorMapError;
use rfb_encodings::{DecodeError, ErrorCategory};
use std::io;
use thiserror::Error;

/// Errors that can occur while processing a server stream.
#[derive(Debug, Error)]
pub enum RfbClientError {
    /// Transport-level error (reading message headers from the stream).
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    /// Rectangle decoding failed.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Protocol error (malformed message, unexpected data).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server used an encoding this session did not enable.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(i32),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A SetColorMapEntries message did not fit the palette.
    #[error("Color map error: {0}")]
    ColorMap(#[from] ColorMapError),
}

impl RfbClientError {
    /// Returns true if this error is potentially retryable.
    ///
    /// Transport failures and decode errors of the I/O category (the stream
    /// ended or delivered a short chunk) qualify: a fresh connection may
    /// succeed where this one broke. Other decoding errors reproduce on the
    /// same data.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
            || matches!(self, Self::Decode(e) if e.category() == ErrorCategory::Io)
    }

    /// Returns true if the session cannot continue after this error.
    ///
    /// A palette miss or a rejected color map write leaves the stream aligned
    /// on the next message; everything else does not.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Decode(e) => e.is_fatal(),
            Self::ColorMap(_) => false,
            _ => true,
        }
    }
}
