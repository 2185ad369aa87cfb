//! Core RFB protocol types.
//!
//! - [`PixelFormat`] - How pixel bytes map to color channels
//! - [`Rectangle`] - Rectangle header with encoding type
//! - Encoding type constants

use crate::io::RfbInStream;
use tokio::io::AsyncRead;

/// RFB pixel format description.
///
/// # Wire Format
///
/// PixelFormat is 16 bytes on the wire:
/// - 1 byte: bits_per_pixel
/// - 1 byte: depth
/// - 1 byte: big_endian (0 or 1)
/// - 1 byte: true_color (0 or 1)
/// - 2 bytes: red_max
/// - 2 bytes: green_max
/// - 2 bytes: blue_max
/// - 1 byte: red_shift
/// - 1 byte: green_shift
/// - 1 byte: blue_shift
/// - 3 bytes: padding (must be zero)
///
/// # Examples
///
/// ```
/// use rfb_protocol::messages::types::PixelFormat;
///
/// let pf = PixelFormat::rgb888();
/// assert_eq!(pf.bytes_per_pixel(), 4);
/// assert!(pf.true_color);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    /// Storage size of one pixel in bits (8, 16 or 32 are decodable).
    pub bits_per_pixel: u8,
    /// Number of significant bits.
    pub depth: u8,
    /// Multi-byte pixels are big endian when set, little endian otherwise.
    pub big_endian: bool,
    /// Pixel values encode RGB directly; otherwise they index the color map.
    pub true_color: bool,
    /// Maximum red value (e.g. 255, not a bit count).
    pub red_max: u16,
    /// Maximum green value.
    pub green_max: u16,
    /// Maximum blue value.
    pub blue_max: u16,
    /// Bit position of the least significant red bit.
    pub red_shift: u8,
    /// Bit position of the least significant green bit.
    pub green_shift: u8,
    /// Bit position of the least significant blue bit.
    pub blue_shift: u8,
}

impl PixelFormat {
    /// Standard 32bpp little-endian true color, red at bit 16, green at 8, blue at 0.
    pub fn rgb888() -> Self {
        Self {
            bits_per_pixel: 32,
            depth: 24,
            big_endian: false,
            true_color: true,
            red_max: 255,
            green_max: 255,
            blue_max: 255,
            red_shift: 16,
            green_shift: 8,
            blue_shift: 0,
        }
    }

    /// 8bpp palette format: every pixel is a color map index.
    pub fn indexed8() -> Self {
        Self {
            bits_per_pixel: 8,
            depth: 8,
            big_endian: false,
            true_color: false,
            red_max: 0,
            green_max: 0,
            blue_max: 0,
            red_shift: 0,
            green_shift: 0,
            blue_shift: 0,
        }
    }

    /// Bytes per pixel on the wire (`bits_per_pixel / 8`).
    pub fn bytes_per_pixel(&self) -> u8 {
        self.bits_per_pixel / 8
    }

    /// Read a PixelFormat from an RFB input stream.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - EOF is reached before all 16 bytes are read
    /// - Boolean fields (big_endian, true_color) are not 0 or 1
    /// - Padding bytes are not zero
    pub async fn read_from<R: AsyncRead + Unpin>(
        stream: &mut RfbInStream<R>,
    ) -> std::io::Result<Self> {
        let bits_per_pixel = stream.read_u8().await?;
        let depth = stream.read_u8().await?;
        let big_endian = read_bool(stream, "big_endian").await?;
        let true_color = read_bool(stream, "true_color").await?;

        let red_max = stream.read_u16().await?;
        let green_max = stream.read_u16().await?;
        let blue_max = stream.read_u16().await?;
        let red_shift = stream.read_u8().await?;
        let green_shift = stream.read_u8().await?;
        let blue_shift = stream.read_u8().await?;

        let mut padding = [0u8; 3];
        stream.read_bytes(&mut padding).await?;
        if padding != [0, 0, 0] {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("padding must be zero, got {:?}", padding),
            ));
        }

        Ok(Self {
            bits_per_pixel,
            depth,
            big_endian,
            true_color,
            red_max,
            green_max,
            blue_max,
            red_shift,
            green_shift,
            blue_shift,
        })
    }
}

async fn read_bool<R: AsyncRead + Unpin>(
    stream: &mut RfbInStream<R>,
    field: &str,
) -> std::io::Result<bool> {
    match stream.read_u8().await? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} must be 0 or 1, got {}", field, other),
        )),
    }
}

/// Rectangle header for framebuffer updates.
///
/// # Wire Format
///
/// Rectangle header is 12 bytes:
/// - 2 bytes: x position
/// - 2 bytes: y position
/// - 2 bytes: width
/// - 2 bytes: height
/// - 4 bytes: encoding type (signed i32)
///
/// The encoding-specific payload that follows is consumed by a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub encoding: i32,
}

impl Rectangle {
    /// Number of pixels covered (`width * height`).
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Read a Rectangle header from an RFB input stream.
    pub async fn read_from<R: AsyncRead + Unpin>(
        stream: &mut RfbInStream<R>,
    ) -> std::io::Result<Self> {
        Ok(Self {
            x: stream.read_u16().await?,
            y: stream.read_u16().await?,
            width: stream.read_u16().await?,
            height: stream.read_u16().await?,
            encoding: stream.read_i32().await?,
        })
    }
}

//
// Encoding type constants
//

/// Raw encoding - uncompressed pixel data.
pub const ENCODING_RAW: i32 = 0;

/// Zlib encoding - raw pixels through one zlib stream per connection.
pub const ENCODING_ZLIB: i32 = 6;

/// DesktopSize pseudo-encoding - framebuffer resized (RFC 6143 7.8.2).
pub const ENCODING_DESKTOP_SIZE: i32 = -223;
