//! Rectangle decoding for RFB (VNC) framebuffer updates.
//!
//! This crate defines the [`Decoder`] trait and the decoders for the Raw,
//! Zlib and DesktopSize encodings. A decoder reads one rectangle's payload
//! from the network stream and turns it into colors (or, for a pseudo
//! encoding, into a change of connection state).
//!
//! # Key Concepts
//!
//! - **Async decoding**: Decoders read from a tokio [`AsyncRead`]-backed [`RfbInStream`]
//! - **Rectangle-based**: Decoders operate on a single rectangle at a time
//! - **Connection context**: Pixel format, color map, framebuffer size and the
//!   persistent zlib stream live in one [`DecodeContext`] per connection
//! - **Fail-fast policy**: No partial results; a failed decode returns an error
//!   and no colors
//!
//! # Example
//!
//! ```no_run
//! use rfb_encodings::{DecodeContext, DecoderRegistry, PixelFormat, Rectangle, RfbInStream};
//! use rfb_encodings::ENCODING_RAW;
//!
//! # async fn run() -> Result<(), rfb_encodings::DecodeError> {
//! let registry = DecoderRegistry::with_standard();
//! let mut ctx = DecodeContext::new(640, 480, PixelFormat::rgb888());
//! let mut stream = RfbInStream::new(std::io::Cursor::new(vec![0u8; 4]));
//!
//! let rect = Rectangle { x: 0, y: 0, width: 1, height: 1, encoding: ENCODING_RAW };
//! let decoded = registry.decode(&mut ctx, &rect, &mut stream).await?;
//! assert_eq!(decoded.colors().map(<[_]>::len), Some(1));
//! # Ok(())
//! # }
//! ```
//!
//! # Encoding Types
//!
//! - [`ENCODING_RAW`] (0): Uncompressed pixel data
//! - [`ENCODING_ZLIB`] (6): Raw pixels through one zlib stream per connection
//!
//! Pseudo-encodings (negative values) indicate special operations:
//!
//! - [`ENCODING_DESKTOP_SIZE`] (-223): Desktop resolution change

use tokio::io::AsyncRead;

// Re-export types from rfb-common and rfb-protocol used by decoders
pub use rfb_common::{Color, ColorMap};
pub use rfb_protocol::io::RfbInStream;
pub use rfb_protocol::messages::types::{
    PixelFormat, Rectangle, ENCODING_DESKTOP_SIZE, ENCODING_RAW, ENCODING_ZLIB,
};

pub mod errors;
pub use errors::{DecodeError, ErrorCategory};

pub mod context;
pub use context::DecodeContext;

pub mod pixel;
pub use pixel::PixelUnpacker;

// Encoding implementations
pub mod raw;
pub use raw::RawDecoder;

pub mod zlib;
pub use zlib::{ZlibDecoder, ZlibStream};

pub mod desktop_size;
pub use desktop_size::DesktopSizeDecoder;

pub mod registry;
pub use registry::{DecoderRegistry, Encoding};

#[cfg(test)]
mod proptest_decoding;

/// Result of decoding one rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// `width * height` colors in row-major order.
    Pixels(Vec<Color>),
    /// The framebuffer now has this size. No pixels accompany it.
    DesktopSize { width: u16, height: u16 },
}

impl Decoded {
    /// The decoded colors, if this rectangle carried pixels.
    pub fn colors(&self) -> Option<&[Color]> {
        match self {
            Self::Pixels(colors) => Some(colors),
            Self::DesktopSize { .. } => None,
        }
    }

    /// Take ownership of the decoded colors, if any.
    pub fn into_colors(self) -> Option<Vec<Color>> {
        match self {
            Self::Pixels(colors) => Some(colors),
            Self::DesktopSize { .. } => None,
        }
    }
}

/// Core trait for all RFB decoding implementations.
///
/// # Contract
///
/// Implementors must:
/// - Read exactly the bytes for the rectangle as defined by their encoding
/// - Return exactly `width * height` colors for pixel encodings
/// - Fail fast with clear errors (no defensive fallbacks, no partial output)
///
/// # Example
///
/// ```no_run
/// use rfb_encodings::{DecodeContext, DecodeError, Decoded, Decoder, Rectangle, RfbInStream};
/// use tokio::io::AsyncRead;
///
/// struct EmptyDecoder;
///
/// impl Decoder for EmptyDecoder {
///     fn encoding_type(&self) -> i32 {
///         -1
///     }
///
///     async fn decode<R: AsyncRead + Unpin>(
///         &self,
///         _ctx: &mut DecodeContext,
///         _rect: &Rectangle,
///         _stream: &mut RfbInStream<R>,
///     ) -> Result<Decoded, DecodeError> {
///         Ok(Decoded::Pixels(Vec::new()))
///     }
/// }
/// ```
#[allow(async_fn_in_trait)]
pub trait Decoder {
    /// Returns the RFB encoding type this decoder handles.
    ///
    /// This should be one of the `ENCODING_*` constants re-exported by this crate.
    fn encoding_type(&self) -> i32;

    /// Decode a single rectangle whose header has already been read.
    ///
    /// # Parameters
    ///
    /// - `ctx`: The connection's decoding state
    /// - `rect`: The rectangle bounds and encoding to decode
    /// - `stream`: Network input stream positioned at the rectangle payload
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input bytes are insufficient (EOF)
    /// - The pixel format cannot be decoded
    /// - The encoding-specific data is invalid
    async fn decode<R: AsyncRead + Unpin>(
        &self,
        ctx: &mut DecodeContext,
        rect: &Rectangle,
        stream: &mut RfbInStream<R>,
    ) -> Result<Decoded, DecodeError>;
}
