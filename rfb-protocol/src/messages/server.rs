//! Server-to-client RFB messages consumed by the decoding core.

use crate::io::RfbInStream;
use rfb_common::Color;
use tokio::io::AsyncRead;

/// SetColorMapEntries message - update color map.
///
/// Used for palette-based pixel formats (`true_color == false`).
///
/// # Wire Format
///
/// - 1 byte: message type (1)
/// - 1 byte: padding
/// - 2 bytes: first color index
/// - 2 bytes: number of colors
/// - For each color: 6 bytes (red u16, green u16, blue u16)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetColorMapEntries {
    pub first_color: u16,
    pub colors: Vec<Color>,
}

impl SetColorMapEntries {
    /// Message type byte.
    pub const MESSAGE_TYPE: u8 = 1;

    /// Read SetColorMapEntries from an RFB input stream.
    ///
    /// The message type byte must already have been consumed by the caller.
    pub async fn read_from<R: AsyncRead + Unpin>(
        stream: &mut RfbInStream<R>,
    ) -> std::io::Result<Self> {
        stream.skip(1).await?; // padding
        let first_color = stream.read_u16().await?;
        let num_colors = stream.read_u16().await? as usize;

        let mut colors = Vec::with_capacity(num_colors);
        for _ in 0..num_colors {
            colors.push(Color {
                red: stream.read_u16().await?,
                green: stream.read_u16().await?,
                blue: stream.read_u16().await?,
            });
        }

        Ok(Self {
            first_color,
            colors,
        })
    }
}
