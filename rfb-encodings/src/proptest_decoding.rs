//! Property tests for rectangle decoding over fragmented input.
//!
//! A rectangle must decode to the same colors no matter where the network
//! splits its bytes, including the zlib chunks that continue one stream.

use crate::{
    DecodeContext, Decoded, DecoderRegistry, PixelFormat, Rectangle, RfbInStream,
    ENCODING_DESKTOP_SIZE, ENCODING_RAW, ENCODING_ZLIB,
};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use proptest::prelude::*;
use rfb_common::Color;
use std::io::Write;

/// A reader that hands out at most `step` bytes per read.
struct TricklingReader {
    data: Vec<u8>,
    pos: usize,
    step: usize,
}

impl tokio::io::AsyncRead for TricklingReader {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        let available = (self.data.len() - self.pos)
            .min(self.step)
            .min(buf.remaining());
        let start = self.pos;
        buf.put_slice(&self.data[start..start + available]);
        self.pos += available;
        std::task::Poll::Ready(Ok(()))
    }
}

fn header(rect: &Rectangle) -> Vec<u8> {
    let mut out = Vec::with_capacity(12);
    out.extend_from_slice(&rect.x.to_be_bytes());
    out.extend_from_slice(&rect.y.to_be_bytes());
    out.extend_from_slice(&rect.width.to_be_bytes());
    out.extend_from_slice(&rect.height.to_be_bytes());
    out.extend_from_slice(&rect.encoding.to_be_bytes());
    out
}

fn to_bytes(px: &[[u8; 3]]) -> Vec<u8> {
    px.iter().flat_map(|p| [p[0], p[1], p[2], 0]).collect()
}

fn colors_of(data: &[u8]) -> Vec<Color> {
    data.chunks_exact(4)
        .map(|p| Color::new(p[2] as u16, p[1] as u16, p[0] as u16))
        .collect()
}

proptest! {
    /// Raw, then two zlib rectangles sharing one stream, then a resize,
    /// all read through a reader that trickles bytes.
    #[test]
    fn test_mixed_update_fragmentation(
        raw_pixels in prop::collection::vec(any::<[u8; 3]>(), 1..16),
        zlib_a in prop::collection::vec(any::<[u8; 3]>(), 1..32),
        zlib_b in prop::collection::vec(any::<[u8; 3]>(), 1..32),
        step in 1usize..40,
    ) {
        let raw_data = to_bytes(&raw_pixels);
        let a_data = to_bytes(&zlib_a);
        let b_data = to_bytes(&zlib_b);

        let raw_rect = Rectangle { x: 0, y: 0, width: raw_pixels.len() as u16, height: 1, encoding: ENCODING_RAW };
        let a_rect = Rectangle { x: 0, y: 1, width: 1, height: zlib_a.len() as u16, encoding: ENCODING_ZLIB };
        let b_rect = Rectangle { x: 1, y: 1, width: zlib_b.len() as u16, height: 1, encoding: ENCODING_ZLIB };
        let resize = Rectangle { x: 0, y: 0, width: 320, height: 200, encoding: ENCODING_DESKTOP_SIZE };

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&a_data).unwrap();
        encoder.flush().unwrap();
        let split = encoder.get_ref().len();
        encoder.write_all(&b_data).unwrap();
        encoder.flush().unwrap();
        let compressed = encoder.get_ref().clone();
        let (chunk_a, chunk_b) = compressed.split_at(split);

        let mut wire = header(&raw_rect);
        wire.extend_from_slice(&raw_data);
        for (rect, chunk) in [(&a_rect, chunk_a), (&b_rect, chunk_b)] {
            wire.extend_from_slice(&header(rect));
            wire.extend_from_slice(&(chunk.len() as u32).to_be_bytes());
            wire.extend_from_slice(chunk);
        }
        wire.extend_from_slice(&header(&resize));

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let registry = DecoderRegistry::with_standard();
            let mut ctx = DecodeContext::new(64, 64, PixelFormat::rgb888());
            let mut stream = RfbInStream::new(TricklingReader { data: wire, pos: 0, step });

            let mut results = Vec::new();
            for _ in 0..4 {
                let rect = Rectangle::read_from(&mut stream).await.unwrap();
                results.push(registry.decode(&mut ctx, &rect, &mut stream).await.unwrap());
            }

            prop_assert_eq!(&results[0], &Decoded::Pixels(colors_of(&raw_data)));
            prop_assert_eq!(&results[1], &Decoded::Pixels(colors_of(&a_data)));
            prop_assert_eq!(&results[2], &Decoded::Pixels(colors_of(&b_data)));
            prop_assert_eq!(&results[3], &Decoded::DesktopSize { width: 320, height: 200 });
            prop_assert_eq!(ctx.framebuffer_size(), (320, 200));
            prop_assert_eq!(stream.available(), 0);
            Ok(())
        })?;
    }
}
