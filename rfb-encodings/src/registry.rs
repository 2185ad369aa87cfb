//! Encoding identifiers and rectangle dispatch.
//!
//! The set of decodable encodings is closed: [`Encoding`] names every one of
//! them, and a [`DecoderRegistry`] decides which of those a connection
//! accepts. Rectangles whose encoding is not registered are a protocol error.

use crate::desktop_size::DesktopSizeDecoder;
use crate::raw::RawDecoder;
use crate::zlib::ZlibDecoder;
use crate::{
    DecodeContext, DecodeError, Decoded, Decoder, Rectangle, RfbInStream, ENCODING_DESKTOP_SIZE,
    ENCODING_RAW, ENCODING_ZLIB,
};
use std::collections::HashMap;
use std::fmt;
use tokio::io::AsyncRead;

/// A rectangle encoding this crate can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Uncompressed pixels (0).
    Raw,
    /// Raw pixels through the connection's zlib stream (6).
    Zlib,
    /// Framebuffer resize pseudo-encoding (-223).
    DesktopSize,
}

impl Encoding {
    /// Every known encoding, in preference order.
    pub const ALL: [Encoding; 3] = [Encoding::Zlib, Encoding::Raw, Encoding::DesktopSize];

    /// The signed 32-bit id used on the wire.
    pub fn wire_id(self) -> i32 {
        match self {
            Self::Raw => ENCODING_RAW,
            Self::Zlib => ENCODING_ZLIB,
            Self::DesktopSize => ENCODING_DESKTOP_SIZE,
        }
    }

    /// Look up an encoding by wire id.
    pub fn from_wire(id: i32) -> Option<Self> {
        match id {
            ENCODING_RAW => Some(Self::Raw),
            ENCODING_ZLIB => Some(Self::Zlib),
            ENCODING_DESKTOP_SIZE => Some(Self::DesktopSize),
            _ => None,
        }
    }

    /// Whether this is a pseudo-encoding (no pixel payload).
    pub fn is_pseudo(self) -> bool {
        self.wire_id() < 0
    }

    async fn decode<R: AsyncRead + Unpin>(
        self,
        ctx: &mut DecodeContext,
        rect: &Rectangle,
        stream: &mut RfbInStream<R>,
    ) -> Result<Decoded, DecodeError> {
        match self {
            Self::Raw => RawDecoder.decode(ctx, rect, stream).await,
            Self::Zlib => ZlibDecoder.decode(ctx, rect, stream).await,
            Self::DesktopSize => DesktopSizeDecoder.decode(ctx, rect, stream).await,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Raw => "Raw",
            Self::Zlib => "Zlib",
            Self::DesktopSize => "DesktopSize",
        };
        write!(f, "{} ({})", name, self.wire_id())
    }
}

/// Maps wire encoding ids to the decoders a connection accepts.
#[derive(Debug, Clone, Default)]
pub struct DecoderRegistry {
    decoders: HashMap<i32, Encoding>,
}

impl DecoderRegistry {
    /// An empty registry that rejects every rectangle.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry accepting every known encoding.
    pub fn with_standard() -> Self {
        let mut reg = Self::new();
        for encoding in Encoding::ALL {
            reg.register(encoding);
        }
        reg
    }

    /// A registry accepting only the given wire ids.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnsupportedEncoding`] for the first id that
    /// names no known encoding.
    pub fn with_encodings(ids: &[i32]) -> Result<Self, DecodeError> {
        let mut reg = Self::new();
        for &id in ids {
            let encoding = Encoding::from_wire(id).ok_or(DecodeError::UnsupportedEncoding(id))?;
            reg.register(encoding);
        }
        Ok(reg)
    }

    /// Accept rectangles of `encoding`.
    pub fn register(&mut self, encoding: Encoding) {
        self.decoders.insert(encoding.wire_id(), encoding);
    }

    /// The registered encoding for a wire id, if any.
    pub fn get(&self, id: i32) -> Option<Encoding> {
        self.decoders.get(&id).copied()
    }

    /// Whether rectangles with this wire id are accepted.
    pub fn contains(&self, id: i32) -> bool {
        self.decoders.contains_key(&id)
    }

    /// Number of registered encodings.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Whether no encoding is registered.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decode one rectangle with the decoder its header names.
    ///
    /// The stream must be positioned right after the rectangle header.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnsupportedEncoding`] without reading anything
    /// when `rect.encoding` is not registered, otherwise whatever the chosen
    /// decoder reports.
    pub async fn decode<R: AsyncRead + Unpin>(
        &self,
        ctx: &mut DecodeContext,
        rect: &Rectangle,
        stream: &mut RfbInStream<R>,
    ) -> Result<Decoded, DecodeError> {
        let encoding = self
            .get(rect.encoding)
            .ok_or(DecodeError::UnsupportedEncoding(rect.encoding))?;

        tracing::debug!(
            target: "rfb_encodings::framing",
            "Dispatch rect=[{},{} {}x{}] to {}",
            rect.x, rect.y, rect.width, rect.height,
            encoding
        );

        encoding.decode(ctx, rect, stream).await
    }
}
