//! Per-connection decoding session.

use crate::config::Config;
use crate::errors::RfbClientError;
use rfb_common::ColorMap;
use rfb_encodings::{DecodeContext, DecodeError, Decoded, DecoderRegistry, PixelFormat};
use rfb_protocol::messages::{Rectangle, SetColorMapEntries};
use rfb_protocol::RfbInStream;
use tokio::io::AsyncRead;

/// One decoded rectangle of a framebuffer update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RectUpdate {
    /// The rectangle header as received.
    pub rect: Rectangle,
    /// What the rectangle decoded to.
    pub decoded: Decoded,
}

/// Decoding state for one server connection.
///
/// Owns the [`DecodeContext`] (pixel format, palette, framebuffer size and
/// the persistent zlib stream) and the set of encodings the configuration
/// enables.
#[derive(Debug)]
pub struct Session {
    ctx: DecodeContext,
    registry: DecoderRegistry,
}

impl Session {
    /// Create a session from the values received in ServerInit.
    ///
    /// # Errors
    ///
    /// Returns [`RfbClientError::Config`] if the configuration is invalid.
    pub fn new(
        config: &Config,
        width: u16,
        height: u16,
        pixel_format: PixelFormat,
    ) -> Result<Self, RfbClientError> {
        config.validate()?;
        let registry = DecoderRegistry::with_encodings(&config.decoding.encodings)
            .map_err(|e| RfbClientError::Config(e.to_string()))?;

        tracing::debug!(
            "Session created: {}x{}, bpp={}, encodings={:?}",
            width,
            height,
            pixel_format.bits_per_pixel,
            config.decoding.encodings
        );

        Ok(Self {
            ctx: DecodeContext::new(width, height, pixel_format),
            registry,
        })
    }

    /// Current framebuffer `(width, height)`.
    pub fn size(&self) -> (u16, u16) {
        self.ctx.framebuffer_size()
    }

    /// The negotiated pixel format.
    pub fn pixel_format(&self) -> &PixelFormat {
        self.ctx.pixel_format()
    }

    /// The current palette.
    pub fn color_map(&self) -> &ColorMap {
        self.ctx.color_map()
    }

    /// The decoding context, for inspection.
    pub fn context(&self) -> &DecodeContext {
        &self.ctx
    }

    /// Switch pixel formats after a SetPixelFormat exchange.
    pub fn set_pixel_format(&mut self, pixel_format: PixelFormat) {
        tracing::debug!(
            "Pixel format changed: bpp={}, true_color={}",
            pixel_format.bits_per_pixel,
            pixel_format.true_color
        );
        self.ctx.set_pixel_format(pixel_format);
    }

    /// Write a SetColorMapEntries message into the palette.
    ///
    /// # Errors
    ///
    /// Returns [`RfbClientError::ColorMap`] if the entries run past the last
    /// palette index. The palette is unchanged in that case.
    pub fn apply_color_map(&mut self, msg: &SetColorMapEntries) -> Result<(), RfbClientError> {
        self.ctx
            .color_map_mut()
            .set_entries(msg.first_color, &msg.colors)?;
        tracing::debug!(
            "Color map updated: first={}, count={}, size={}",
            msg.first_color,
            msg.colors.len(),
            self.ctx.color_map().len()
        );
        Ok(())
    }

    /// Apply a single rectangle whose header has already been read.
    pub async fn apply_rectangle<R: AsyncRead + Unpin>(
        &mut self,
        stream: &mut RfbInStream<R>,
        rect: &Rectangle,
    ) -> Result<Decoded, RfbClientError> {
        tracing::debug!(
            "FramebufferUpdate rect: x={}, y={}, w={}, h={}, encoding={}",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            rect.encoding
        );

        self.registry
            .decode(&mut self.ctx, rect, stream)
            .await
            .map_err(|e| match e {
                DecodeError::UnsupportedEncoding(id) => RfbClientError::UnsupportedEncoding(id),
                other => RfbClientError::Decode(other),
            })
    }

    /// Apply multiple rectangles in order.
    ///
    /// Stops at the first failing rectangle; nothing decoded before it is
    /// returned.
    pub async fn apply_update<R: AsyncRead + Unpin>(
        &mut self,
        stream: &mut RfbInStream<R>,
        rects: &[Rectangle],
    ) -> Result<Vec<RectUpdate>, RfbClientError> {
        let mut updates = Vec::with_capacity(rects.len());
        for rect in rects {
            let decoded = self.apply_rectangle(stream, rect).await?;
            updates.push(RectUpdate {
                rect: *rect,
                decoded,
            });
        }
        Ok(updates)
    }

    /// Apply an update by streaming from the input.
    ///
    /// Reads the FramebufferUpdate body after its message-type byte (padding
    /// and rectangle count), then each rectangle header and payload.
    pub async fn apply_update_stream<R: AsyncRead + Unpin>(
        &mut self,
        stream: &mut RfbInStream<R>,
    ) -> Result<Vec<RectUpdate>, RfbClientError> {
        // FramebufferUpdate header: 1 byte padding + 2 bytes rect count
        stream.skip(1).await.map_err(|e| {
            RfbClientError::Protocol(format!("failed to read FramebufferUpdate padding: {e}"))
        })?;
        let num = stream.read_u16().await.map_err(|e| {
            RfbClientError::Protocol(format!("failed to read FramebufferUpdate rect count: {e}"))
        })?;

        let mut updates = Vec::with_capacity(num as usize);
        for _ in 0..num {
            let rect = Rectangle::read_from(stream).await.map_err(|e| {
                RfbClientError::Protocol(format!("failed to read Rectangle header: {e}"))
            })?;
            let decoded = self.apply_rectangle(stream, &rect).await?;
            updates.push(RectUpdate { rect, decoded });
        }
        Ok(updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rfb_common::Color;
    use rfb_encodings::{ENCODING_DESKTOP_SIZE, ENCODING_RAW, ENCODING_ZLIB};
    use std::io::Cursor;

    fn rect(width: u16, height: u16, encoding: i32) -> Rectangle {
        Rectangle {
            x: 0,
            y: 0,
            width,
            height,
            encoding,
        }
    }

    #[test]
    fn test_new_session() {
        let session = Session::new(&Config::default(), 800, 600, PixelFormat::rgb888()).unwrap();
        assert_eq!(session.size(), (800, 600));
        assert_eq!(*session.pixel_format(), PixelFormat::rgb888());
        assert!(session.color_map().is_empty());
        assert!(!session.context().zlib_stream().is_initialized());
    }

    #[test]
    fn test_new_session_rejects_invalid_config() {
        let mut config = Config::default();
        config.decoding.encodings.clear();
        let err = Session::new(&config, 1, 1, PixelFormat::rgb888()).unwrap_err();
        assert!(matches!(err, RfbClientError::Config(_)));
    }

    #[tokio::test]
    async fn test_disabled_encoding_is_rejected() {
        let config = Config::builder().encodings([ENCODING_RAW]).build().unwrap();
        let mut session = Session::new(&config, 10, 10, PixelFormat::rgb888()).unwrap();
        let mut stream = RfbInStream::new(Cursor::new(vec![0u8; 8]));

        let err = session
            .apply_rectangle(&mut stream, &rect(1, 1, ENCODING_ZLIB))
            .await
            .unwrap_err();
        assert!(matches!(err, RfbClientError::UnsupportedEncoding(6)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_color_map_then_palette_rect() {
        let mut session = Session::new(&Config::default(), 10, 10, PixelFormat::indexed8()).unwrap();
        session
            .apply_color_map(&SetColorMapEntries {
                first_color: 2,
                colors: vec![Color::new(100, 200, 300)],
            })
            .unwrap();
        assert_eq!(session.color_map().len(), 3);

        let mut stream = RfbInStream::new(Cursor::new(vec![2, 2]));
        let decoded = session
            .apply_rectangle(&mut stream, &rect(2, 1, ENCODING_RAW))
            .await
            .unwrap();
        assert_eq!(decoded, Decoded::Pixels(vec![Color::new(100, 200, 300); 2]));
    }

    #[test]
    fn test_color_map_overflow() {
        let mut session = Session::new(&Config::default(), 10, 10, PixelFormat::indexed8()).unwrap();
        let err = session
            .apply_color_map(&SetColorMapEntries {
                first_color: 65_535,
                colors: vec![Color::default(); 2],
            })
            .unwrap_err();
        assert!(matches!(err, RfbClientError::ColorMap(_)));
        assert!(session.color_map().is_empty());
    }

    #[tokio::test]
    async fn test_apply_update_stops_at_first_error() {
        let mut session = Session::new(&Config::default(), 10, 10, PixelFormat::rgb888()).unwrap();

        // First rect is complete, second is short
        let mut stream = RfbInStream::new(Cursor::new(vec![0u8; 6]));
        let rects = [rect(1, 1, ENCODING_RAW), rect(1, 1, ENCODING_RAW)];

        let err = session.apply_update(&mut stream, &rects).await.unwrap_err();
        assert!(matches!(err, RfbClientError::Decode(DecodeError::Io { .. })));
    }

    #[tokio::test]
    async fn test_apply_update_stream() {
        let mut session = Session::new(&Config::default(), 10, 10, PixelFormat::rgb888()).unwrap();

        let mut wire = vec![0, 0, 2];
        for r in [rect(1, 1, ENCODING_RAW), rect(40, 30, ENCODING_DESKTOP_SIZE)] {
            wire.extend_from_slice(&r.x.to_be_bytes());
            wire.extend_from_slice(&r.y.to_be_bytes());
            wire.extend_from_slice(&r.width.to_be_bytes());
            wire.extend_from_slice(&r.height.to_be_bytes());
            wire.extend_from_slice(&r.encoding.to_be_bytes());
            if r.encoding == ENCODING_RAW {
                wire.extend_from_slice(&[0x10, 0x20, 0x30, 0x00]);
            }
        }
        let mut stream = RfbInStream::new(Cursor::new(wire));

        let updates = session.apply_update_stream(&mut stream).await.unwrap();
        assert_eq!(
            updates,
            vec![
                RectUpdate {
                    rect: rect(1, 1, ENCODING_RAW),
                    decoded: Decoded::Pixels(vec![Color::new(0x30, 0x20, 0x10)]),
                },
                RectUpdate {
                    rect: rect(40, 30, ENCODING_DESKTOP_SIZE),
                    decoded: Decoded::DesktopSize {
                        width: 40,
                        height: 30
                    },
                },
            ]
        );
        assert_eq!(session.size(), (40, 30));
    }

    #[tokio::test]
    async fn test_truncated_update_header() {
        let mut session = Session::new(&Config::default(), 10, 10, PixelFormat::rgb888()).unwrap();
        let mut stream = RfbInStream::new(Cursor::new(vec![0]));

        let err = session.apply_update_stream(&mut stream).await.unwrap_err();
        assert!(matches!(err, RfbClientError::Protocol(_)));
    }
}
