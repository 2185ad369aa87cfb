//! DesktopSize pseudo-encoding (-223) - framebuffer resize notification.
//!
//! The rectangle header carries the new framebuffer size in its width and
//! height fields. No payload follows.

use crate::{
    DecodeContext, DecodeError, Decoded, Decoder, Rectangle, RfbInStream, ENCODING_DESKTOP_SIZE,
};
use tokio::io::AsyncRead;

/// Applies a server-side desktop resize to the connection context.
pub struct DesktopSizeDecoder;

impl Decoder for DesktopSizeDecoder {
    fn encoding_type(&self) -> i32 {
        ENCODING_DESKTOP_SIZE
    }

    async fn decode<R: AsyncRead + Unpin>(
        &self,
        ctx: &mut DecodeContext,
        rect: &Rectangle,
        _stream: &mut RfbInStream<R>,
    ) -> Result<Decoded, DecodeError> {
        let (old_width, old_height) = ctx.framebuffer_size();
        ctx.framebuffer_width = rect.width;
        ctx.framebuffer_height = rect.height;

        tracing::info!(
            "Desktop resized: {}x{} -> {}x{}",
            old_width,
            old_height,
            rect.width,
            rect.height
        );

        Ok(Decoded::DesktopSize {
            width: rect.width,
            height: rect.height,
        })
    }
}
