//! Error types for rectangle decoding.

use std::io;
use thiserror::Error;

/// Broad classes of decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The input stream did not deliver the bytes the rectangle needs.
    Io,
    /// The data or the negotiated format cannot be decoded.
    Protocol,
    /// The connection's zlib stream failed or was already unusable.
    StreamState,
}

/// Errors that can occur while decoding a rectangle.
///
/// A failed decode never yields a partially filled color buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Reading from the input stream failed (short read, closed stream).
    #[error("I/O error while reading {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    /// Only 8, 16 and 32 bits per pixel are decodable.
    #[error("unsupported bits per pixel: {0} (expected 8, 16 or 32)")]
    UnsupportedBitsPerPixel(u8),

    /// A palette pixel referenced an index the color map does not contain.
    #[error("palette index {index} outside color map of {len} entries")]
    PaletteIndexOutOfRange { index: u32, len: usize },

    /// Pixel data ended in the middle of a pixel.
    #[error("pixel data of {len} bytes is not a multiple of {bytes_per_pixel} bytes per pixel")]
    TruncatedPixel { len: usize, bytes_per_pixel: usize },

    /// Fewer compressed bytes were available than the length field declared.
    #[error("compressed chunk truncated: length field declared {expected} bytes, copied {copied}")]
    ChunkLengthMismatch { expected: u32, copied: usize },

    /// No decoder is registered for the rectangle's encoding id.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(i32),

    /// The zlib stream rejected its input.
    #[error("zlib stream corrupt: {0}")]
    StreamCorrupt(#[from] flate2::DecompressError),

    /// The zlib stream ran out of input before producing the rectangle's pixels.
    #[error("zlib stream exhausted: needed {needed} bytes, produced {produced}")]
    StreamExhausted { needed: usize, produced: usize },

    /// An earlier failure left the connection's zlib stream unusable.
    #[error("zlib stream is unusable after an earlier failure")]
    StreamPoisoned,
}

impl DecodeError {
    pub(crate) fn io(context: &'static str, source: io::Error) -> Self {
        Self::Io { context, source }
    }

    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io { .. } | Self::ChunkLengthMismatch { .. } => ErrorCategory::Io,
            Self::UnsupportedBitsPerPixel(_)
            | Self::PaletteIndexOutOfRange { .. }
            | Self::TruncatedPixel { .. }
            | Self::UnsupportedEncoding(_) => ErrorCategory::Protocol,
            Self::StreamCorrupt(_) | Self::StreamExhausted { .. } | Self::StreamPoisoned => {
                ErrorCategory::StreamState
            }
        }
    }

    /// Returns true if the connection cannot continue after this error.
    ///
    /// Every failure except a palette lookup miss leaves the input stream
    /// (or the zlib stream) at an unknown position. A palette miss is only
    /// detected after the rectangle's bytes were fully consumed.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::PaletteIndexOutOfRange { .. })
    }
}
