//! Property tests for message framing.
//!
//! RFB parsing must not depend on how the network splits the byte stream,
//! so every parser is fed through a reader that fragments at an arbitrary
//! boundary.

use super::server::*;
use super::types::*;
use crate::io::RfbInStream;
use bytes::BytesMut;
use proptest::prelude::*;
use rfb_common::Color;

/// A reader that returns bytes up to `boundary` on its first read and the
/// rest afterwards.
struct FragmentingReader {
    data: Vec<u8>,
    pos: usize,
    boundary: usize,
}

impl FragmentingReader {
    fn new(data: Vec<u8>, boundary: usize) -> Self {
        let boundary = boundary.min(data.len());
        Self {
            data,
            pos: 0,
            boundary,
        }
    }
}

impl tokio::io::AsyncRead for FragmentingReader {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        if self.pos >= self.data.len() {
            return std::task::Poll::Ready(Ok(()));
        }

        let available = if self.pos < self.boundary {
            (self.boundary - self.pos).min(buf.remaining())
        } else {
            (self.data.len() - self.pos).min(buf.remaining())
        };

        let start = self.pos;
        buf.put_slice(&self.data[start..start + available]);
        self.pos += available;

        std::task::Poll::Ready(Ok(()))
    }
}

fn pixel_format_bytes(pf: &PixelFormat) -> Vec<u8> {
    let mut out = vec![
        pf.bits_per_pixel,
        pf.depth,
        pf.big_endian as u8,
        pf.true_color as u8,
    ];
    out.extend_from_slice(&pf.red_max.to_be_bytes());
    out.extend_from_slice(&pf.green_max.to_be_bytes());
    out.extend_from_slice(&pf.blue_max.to_be_bytes());
    out.extend_from_slice(&[pf.red_shift, pf.green_shift, pf.blue_shift, 0, 0, 0]);
    out
}

fn rectangle_bytes(rect: &Rectangle) -> Vec<u8> {
    let mut out = Vec::with_capacity(12);
    out.extend_from_slice(&rect.x.to_be_bytes());
    out.extend_from_slice(&rect.y.to_be_bytes());
    out.extend_from_slice(&rect.width.to_be_bytes());
    out.extend_from_slice(&rect.height.to_be_bytes());
    out.extend_from_slice(&rect.encoding.to_be_bytes());
    out
}

fn arbitrary_pixel_format() -> impl Strategy<Value = PixelFormat> {
    (
        prop::sample::select(vec![8u8, 16, 32]),
        prop::bool::ANY,
        prop::bool::ANY,
        prop::sample::select(vec![7u16, 31, 63, 255, 1023]),
        0u8..32,
    )
        .prop_map(|(bpp, big_endian, true_color, max, shift)| PixelFormat {
            bits_per_pixel: bpp,
            depth: bpp.min(24),
            big_endian,
            true_color,
            red_max: max,
            green_max: max,
            blue_max: max,
            red_shift: shift,
            green_shift: shift / 2,
            blue_shift: 0,
        })
}

fn arbitrary_rectangle() -> impl Strategy<Value = Rectangle> {
    (
        0u16..=1920,
        0u16..=1080,
        0u16..=640,
        0u16..=480,
        prop::sample::select(vec![ENCODING_RAW, ENCODING_ZLIB, ENCODING_DESKTOP_SIZE]),
    )
        .prop_map(|(x, y, w, h, enc)| Rectangle {
            x,
            y,
            width: w,
            height: h,
            encoding: enc,
        })
}

proptest! {
    /// PixelFormat parsing with fragmentation at every possible byte boundary.
    #[test]
    fn test_pixel_format_fragmentation(
        pf in arbitrary_pixel_format(),
        boundary in 0usize..16
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let reader = FragmentingReader::new(pixel_format_bytes(&pf), boundary);
            let mut in_stream = RfbInStream::new(reader);

            let parsed = PixelFormat::read_from(&mut in_stream).await.unwrap();
            prop_assert_eq!(pf, parsed);
            Ok(())
        })?;
    }

    /// A run of rectangle headers parses the same regardless of fragmentation.
    #[test]
    fn test_rectangle_headers_fragmentation(
        rectangles in prop::collection::vec(arbitrary_rectangle(), 0..10),
        boundary in 0usize..120
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let buffer: Vec<u8> = rectangles.iter().flat_map(rectangle_bytes).collect();
            let reader = FragmentingReader::new(buffer, boundary);
            let mut in_stream = RfbInStream::new(reader);

            for expected in &rectangles {
                let parsed = Rectangle::read_from(&mut in_stream).await.unwrap();
                prop_assert_eq!(*expected, parsed);
            }
            Ok(())
        })?;
    }

    /// SetColorMapEntries parsing with fragmentation.
    #[test]
    fn test_colormap_fragmentation(
        first_color in 0u16..=255,
        num_colors in 0usize..20,
        boundary in 0usize..130
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let colors: Vec<_> = (0..num_colors)
                .map(|i| Color::new((i * 1000) as u16, (i * 2000) as u16, (i * 3000) as u16))
                .collect();

            let mut buffer = vec![0u8];
            buffer.extend_from_slice(&first_color.to_be_bytes());
            buffer.extend_from_slice(&(colors.len() as u16).to_be_bytes());
            for c in &colors {
                buffer.extend_from_slice(&c.red.to_be_bytes());
                buffer.extend_from_slice(&c.green.to_be_bytes());
                buffer.extend_from_slice(&c.blue.to_be_bytes());
            }

            let reader = FragmentingReader::new(buffer, boundary);
            let mut in_stream = RfbInStream::new(reader);

            let parsed = SetColorMapEntries::read_from(&mut in_stream).await.unwrap();
            prop_assert_eq!(SetColorMapEntries { first_color, colors }, parsed);
            Ok(())
        })?;
    }

    /// Bounded copies never take more than requested and never stop short
    /// while data remains.
    #[test]
    fn test_read_up_to_fragmentation(
        data in prop::collection::vec(any::<u8>(), 0..200),
        want in 0usize..250,
        boundary in 0usize..200
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let reader = FragmentingReader::new(data.clone(), boundary);
            let mut in_stream = RfbInStream::new(reader);

            let mut dst = BytesMut::new();
            let copied = in_stream.read_up_to(&mut dst, want).await.unwrap();
            let expected = want.min(data.len());
            prop_assert_eq!(copied, expected);
            prop_assert_eq!(&dst[..], &data[..expected]);
            Ok(())
        })?;
    }
}
