//! Zlib encoding decoder - raw pixels through one persistent zlib stream.
//!
//! Zlib encoding (type 6) sends each rectangle as a length-prefixed chunk of
//! compressed data. All chunks on a connection belong to a single zlib
//! stream: only the very first chunk carries the zlib header, and every later
//! chunk continues the deflate data where the previous one stopped.
//!
//! # Wire Format
//!
//! ```text
//! +------------------+
//! | length           |  4 bytes (u32 big-endian)
//! +------------------+
//! | zlib_data        |  'length' bytes, continuation of the connection stream
//! +------------------+
//! ```
//!
//! Once inflated, the data is exactly `width * height * bytes_per_pixel`
//! bytes of raw pixels.
//!
//! # Stream State
//!
//! The inflater and the compressed bytes it has not yet consumed live in a
//! [`ZlibStream`] owned by the connection's [`DecodeContext`]. A chunk may end
//! before the deflate block it started, so leftover input stays buffered for
//! the next rectangle. The inflater is created on the first zlib rectangle
//! and never reset. After any fatal error the stream is poisoned and every
//! later zlib rectangle on the connection fails.
//!
//! # Example
//!
//! ```no_run
//! use rfb_encodings::{Decoder, ZlibDecoder, ENCODING_ZLIB};
//!
//! let decoder = ZlibDecoder;
//! assert_eq!(decoder.encoding_type(), ENCODING_ZLIB);
//! ```

use crate::raw::{pixel_data_len, unpack_rect};
use crate::{DecodeContext, DecodeError, Decoded, Decoder, Rectangle, RfbInStream, ENCODING_ZLIB};
use bytes::{Buf, BytesMut};
use flate2::{Decompress, FlushDecompress, Status};
use std::fmt;
use tokio::io::AsyncRead;

/// Per-connection zlib stream state.
pub struct ZlibStream {
    inflater: Option<Decompress>,
    pending: BytesMut,
    poisoned: bool,
}

impl ZlibStream {
    /// Create an empty stream. The inflater is created on first use.
    pub fn new() -> Self {
        Self {
            inflater: None,
            pending: BytesMut::new(),
            poisoned: false,
        }
    }

    /// Whether a zlib rectangle has been decoded on this connection.
    pub fn is_initialized(&self) -> bool {
        self.inflater.is_some()
    }

    /// Whether an earlier failure made the stream unusable.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Compressed bytes received but not yet consumed by the inflater.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Total compressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.inflater.as_ref().map_or(0, Decompress::total_in)
    }

    /// Total bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.inflater.as_ref().map_or(0, Decompress::total_out)
    }

    /// Fill `out` completely from the stream, continuing where the last call
    /// stopped.
    fn inflate_exact(&mut self, out: &mut [u8]) -> Result<(), DecodeError> {
        let inflater = self
            .inflater
            .get_or_insert_with(|| Decompress::new(true)); // zlib wrapper

        let mut filled = 0;
        while filled < out.len() {
            let before_in = inflater.total_in();
            let before_out = inflater.total_out();

            let status =
                inflater.decompress(&self.pending, &mut out[filled..], FlushDecompress::None)?;

            let consumed = (inflater.total_in() - before_in) as usize;
            let produced = (inflater.total_out() - before_out) as usize;
            self.pending.advance(consumed);
            filled += produced;

            tracing::trace!(
                target: "rfb_encodings::framing",
                "Zlib inflate step: consumed={}, produced={}, filled={}/{}, pending={}",
                consumed,
                produced,
                filled,
                out.len(),
                self.pending.len()
            );

            let stalled = consumed == 0 && produced == 0;
            if filled < out.len() && (status == Status::StreamEnd || stalled) {
                return Err(DecodeError::StreamExhausted {
                    needed: out.len(),
                    produced: filled,
                });
            }
        }
        Ok(())
    }
}

impl Default for ZlibStream {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ZlibStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZlibStream")
            .field("initialized", &self.is_initialized())
            .field("pending", &self.pending.len())
            .field("poisoned", &self.poisoned)
            .field("total_in", &self.total_in())
            .field("total_out", &self.total_out())
            .finish()
    }
}

/// Decoder for Zlib encoding.
///
/// Stateless itself; the stream it continues belongs to the
/// [`DecodeContext`] passed to each call.
pub struct ZlibDecoder;

impl Decoder for ZlibDecoder {
    fn encoding_type(&self) -> i32 {
        ENCODING_ZLIB
    }

    async fn decode<R: AsyncRead + Unpin>(
        &self,
        ctx: &mut DecodeContext,
        rect: &Rectangle,
        stream: &mut RfbInStream<R>,
    ) -> Result<Decoded, DecodeError> {
        if ctx.zlib.poisoned {
            return Err(DecodeError::StreamPoisoned);
        }

        tracing::debug!(
            target: "rfb_encodings::framing",
            "Zlib decode start: rect=[{},{} {}x{}] buffer_before={} pending={}",
            rect.x, rect.y, rect.width, rect.height,
            stream.available(),
            ctx.zlib.pending.len()
        );

        match decode_chunk(ctx, rect, stream).await {
            Ok(decoded) => Ok(decoded),
            Err(err) => {
                if err.is_fatal() {
                    ctx.zlib.poisoned = true;
                    tracing::warn!(
                        "Zlib stream poisoned by rect=[{},{} {}x{}]: {}",
                        rect.x,
                        rect.y,
                        rect.width,
                        rect.height,
                        err
                    );
                }
                Err(err)
            }
        }
    }
}

async fn decode_chunk<R: AsyncRead + Unpin>(
    ctx: &mut DecodeContext,
    rect: &Rectangle,
    stream: &mut RfbInStream<R>,
) -> Result<Decoded, DecodeError> {
    let length = stream
        .read_u32()
        .await
        .map_err(|e| DecodeError::io("zlib chunk length", e))?;

    let copied = stream
        .read_up_to(&mut ctx.zlib.pending, length as usize)
        .await
        .map_err(|e| DecodeError::io("zlib chunk data", e))?;
    if copied != length as usize {
        return Err(DecodeError::ChunkLengthMismatch {
            expected: length,
            copied,
        });
    }

    // The chunk is consumed before the format is checked, so a rejected
    // format leaves the stream on the next rectangle header.
    let expected_bytes = pixel_data_len(rect, &ctx.pixel_format)?;

    let mut pixel_data = vec![0u8; expected_bytes];
    if expected_bytes > 0 {
        ctx.zlib.inflate_exact(&mut pixel_data)?;
    }

    let colors = unpack_rect(&pixel_data, &ctx.pixel_format, &ctx.color_map)?;

    tracing::debug!(
        target: "rfb_encodings::framing",
        "Zlib decode end: compressed={}, inflated={}, pending={}, buffer_after={}",
        length,
        expected_bytes,
        ctx.zlib.pending.len(),
        stream.available()
    );

    Ok(Decoded::Pixels(colors))
}
