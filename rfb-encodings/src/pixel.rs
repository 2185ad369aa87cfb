//! Pixel unpacking - wire pixel bytes to [`Color`] values.
//!
//! Each pixel occupies `bits_per_pixel / 8` bytes in the byte order the
//! pixel format declares. The bytes are assembled into a `u32` and then
//! interpreted in one of two ways:
//!
//! - **True color**: each channel is `(value >> shift) & max`. `max` is the
//!   literal channel maximum (255 for 8 bits), so it doubles as the mask.
//! - **Palette**: the value is an index into the connection's [`ColorMap`].
//!
//! Channel values are not rescaled; a 5-bit red channel decodes to 0..=31.
//!
//! # Example
//!
//! ```
//! use rfb_encodings::{ColorMap, PixelFormat, PixelUnpacker};
//! use rfb_common::Color;
//!
//! let pf = PixelFormat::rgb888();
//! let map = ColorMap::new();
//! let unpacker = PixelUnpacker::new(&pf, &map).unwrap();
//!
//! let colors = unpacker.unpack(&[0x00, 0x00, 0xFF, 0x00, 0x00, 0xFF, 0x00, 0x00]).unwrap();
//! assert_eq!(colors, vec![Color::new(255, 0, 0), Color::new(0, 255, 0)]);
//! ```

use crate::{ColorMap, DecodeError, PixelFormat};
use rfb_common::Color;

/// Bytes per pixel for a decodable pixel format.
///
/// # Errors
///
/// Returns [`DecodeError::UnsupportedBitsPerPixel`] unless `bits_per_pixel`
/// is 8, 16 or 32.
pub fn bytes_per_pixel(format: &PixelFormat) -> Result<usize, DecodeError> {
    match format.bits_per_pixel {
        8 | 16 | 32 => Ok(format.bytes_per_pixel() as usize),
        other => Err(DecodeError::UnsupportedBitsPerPixel(other)),
    }
}

/// Converts wire pixels into colors for one pixel format and color map.
#[derive(Debug, Clone, Copy)]
pub struct PixelUnpacker<'a> {
    format: &'a PixelFormat,
    color_map: &'a ColorMap,
    bytes_per_pixel: usize,
}

impl<'a> PixelUnpacker<'a> {
    /// Create an unpacker, validating the pixel width up front.
    pub fn new(format: &'a PixelFormat, color_map: &'a ColorMap) -> Result<Self, DecodeError> {
        Ok(Self {
            format,
            color_map,
            bytes_per_pixel: bytes_per_pixel(format)?,
        })
    }

    /// Bytes consumed per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    /// Assemble one pixel's bytes into an integer in the declared byte order.
    ///
    /// `pixel` must be exactly [`bytes_per_pixel`](Self::bytes_per_pixel) long.
    pub fn raw_value(&self, pixel: &[u8]) -> u32 {
        debug_assert_eq!(pixel.len(), self.bytes_per_pixel);
        if self.format.big_endian {
            pixel
                .iter()
                .fold(0u32, |value, &byte| (value << 8) | byte as u32)
        } else {
            pixel
                .iter()
                .rev()
                .fold(0u32, |value, &byte| (value << 8) | byte as u32)
        }
    }

    /// Interpret a raw pixel value as a color.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::PaletteIndexOutOfRange`] for a palette format
    /// when `raw` is at or past the color map's `len()`. Indices below that
    /// which were never set read as black.
    pub fn color(&self, raw: u32) -> Result<Color, DecodeError> {
        let pf = self.format;
        if pf.true_color {
            return Ok(Color {
                red: channel(raw, pf.red_shift, pf.red_max),
                green: channel(raw, pf.green_shift, pf.green_max),
                blue: channel(raw, pf.blue_shift, pf.blue_max),
            });
        }

        self.color_map
            .get(raw)
            .ok_or(DecodeError::PaletteIndexOutOfRange {
                index: raw,
                len: self.color_map.len(),
            })
    }

    /// Unpack a tightly packed run of pixels.
    ///
    /// # Errors
    ///
    /// Fails if `data` ends mid-pixel or a palette index is out of range.
    /// No colors are returned on failure.
    pub fn unpack(&self, data: &[u8]) -> Result<Vec<Color>, DecodeError> {
        if data.len() % self.bytes_per_pixel != 0 {
            return Err(DecodeError::TruncatedPixel {
                len: data.len(),
                bytes_per_pixel: self.bytes_per_pixel,
            });
        }

        data.chunks_exact(self.bytes_per_pixel)
            .map(|pixel| self.color(self.raw_value(pixel)))
            .collect()
    }
}

/// Extract one true color channel. Shifts past the value width yield zero.
fn channel(raw: u32, shift: u8, max: u16) -> u16 {
    (raw.checked_shr(shift as u32).unwrap_or(0) & max as u32) as u16
}
