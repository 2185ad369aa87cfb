//! Raw encoding decoder - uncompressed pixel data.
//!
//! Raw encoding (type 0) transmits every pixel of the rectangle in the
//! connection's pixel format, row by row, with no length prefix.
//!
//! # Wire Format
//!
//! ```text
//! +-------------+
//! | Pixel data  |  width * height * bytes_per_pixel bytes
//! +-------------+
//! ```
//!
//! # Example
//!
//! ```no_run
//! use rfb_encodings::{Decoder, RawDecoder, ENCODING_RAW};
//!
//! let decoder = RawDecoder;
//! assert_eq!(decoder.encoding_type(), ENCODING_RAW);
//! ```

use crate::pixel::{self, PixelUnpacker};
use crate::{
    DecodeContext, DecodeError, Decoded, Decoder, PixelFormat, Rectangle, RfbInStream,
    ENCODING_RAW,
};
use rfb_common::{Color, ColorMap};
use tokio::io::AsyncRead;

/// Decoder for raw (uncompressed) pixel data.
pub struct RawDecoder;

impl Decoder for RawDecoder {
    fn encoding_type(&self) -> i32 {
        ENCODING_RAW
    }

    async fn decode<R: AsyncRead + Unpin>(
        &self,
        ctx: &mut DecodeContext,
        rect: &Rectangle,
        stream: &mut RfbInStream<R>,
    ) -> Result<Decoded, DecodeError> {
        let buffer_before = stream.available();
        tracing::debug!(
            target: "rfb_encodings::framing",
            "Raw decode start: rect=[{},{} {}x{}] buffer_before={}",
            rect.x, rect.y, rect.width, rect.height,
            buffer_before
        );

        // Reject the format before touching the stream
        let total_bytes = pixel_data_len(rect, &ctx.pixel_format)?;
        if total_bytes == 0 {
            return Ok(Decoded::Pixels(Vec::new()));
        }

        let mut pixel_data = vec![0u8; total_bytes];
        stream
            .read_bytes(&mut pixel_data)
            .await
            .map_err(|e| DecodeError::io("raw pixel data", e))?;

        let colors = unpack_rect(&pixel_data, &ctx.pixel_format, &ctx.color_map)?;

        tracing::debug!(
            target: "rfb_encodings::framing",
            "Raw decode end: bytes_consumed={}, buffer_after={}",
            total_bytes,
            stream.available()
        );

        Ok(Decoded::Pixels(colors))
    }
}

/// Number of payload bytes a rectangle's pixels occupy.
pub(crate) fn pixel_data_len(rect: &Rectangle, format: &PixelFormat) -> Result<usize, DecodeError> {
    Ok(rect.area() * pixel::bytes_per_pixel(format)?)
}

/// Unpack a rectangle's pixel bytes in row-major order (y outer, x inner).
///
/// Shared by every encoding whose payload is, after any decompression, a
/// plain run of raw pixels.
pub(crate) fn unpack_rect(
    data: &[u8],
    format: &PixelFormat,
    color_map: &ColorMap,
) -> Result<Vec<Color>, DecodeError> {
    PixelUnpacker::new(format, color_map)?.unpack(data)
}
