//! Connection-scoped decoding state.

use crate::zlib::ZlibStream;
use crate::{ColorMap, PixelFormat};

/// Everything a decoder needs to know about the connection it serves.
///
/// One context exists per connection and lives as long as the connection.
/// Decoders take it by `&mut`, which rules out concurrent decodes on the
/// same connection.
///
/// - The pixel format and color map are owned here but only changed by the
///   connection owner (SetPixelFormat / SetColorMapEntries handling).
/// - The framebuffer size is changed by the DesktopSize pseudo-decoder.
/// - The zlib stream is created on the first Zlib rectangle and then kept
///   for the rest of the connection.
#[derive(Debug)]
pub struct DecodeContext {
    pub(crate) pixel_format: PixelFormat,
    pub(crate) color_map: ColorMap,
    pub(crate) framebuffer_width: u16,
    pub(crate) framebuffer_height: u16,
    pub(crate) zlib: ZlibStream,
}

impl DecodeContext {
    /// Create the context for a new connection (values from ServerInit).
    pub fn new(framebuffer_width: u16, framebuffer_height: u16, pixel_format: PixelFormat) -> Self {
        Self {
            pixel_format,
            color_map: ColorMap::new(),
            framebuffer_width,
            framebuffer_height,
            zlib: ZlibStream::new(),
        }
    }

    /// The negotiated pixel format.
    pub fn pixel_format(&self) -> &PixelFormat {
        &self.pixel_format
    }

    /// Replace the pixel format after a SetPixelFormat exchange.
    ///
    /// The zlib stream is not affected; it carries bytes, not pixels.
    pub fn set_pixel_format(&mut self, pixel_format: PixelFormat) {
        self.pixel_format = pixel_format;
    }

    /// The current palette.
    pub fn color_map(&self) -> &ColorMap {
        &self.color_map
    }

    /// Mutable access to the palette for SetColorMapEntries handling.
    pub fn color_map_mut(&mut self) -> &mut ColorMap {
        &mut self.color_map
    }

    /// Current framebuffer `(width, height)`.
    pub fn framebuffer_size(&self) -> (u16, u16) {
        (self.framebuffer_width, self.framebuffer_height)
    }

    /// The connection's persistent zlib stream state.
    pub fn zlib_stream(&self) -> &ZlibStream {
        &self.zlib
    }
}
