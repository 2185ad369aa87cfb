//! Headless decoding example - decode a synthesized server stream and log it.
//!
//! Usage:
//!   cargo run --example headless_decode -- [config.toml]
//!
//! This example demonstrates:
//! - Loading a session configuration (or using the defaults)
//! - Initializing logging from the configured filter (RUST_LOG overrides it)
//! - Decoding Raw, Zlib and DesktopSize rectangles from one stream
//! - Inspecting the persistent zlib stream afterwards

use flate2::write::ZlibEncoder;
use flate2::Compression;
use rfb_client::{Config, Session};
use rfb_encodings::{
    Decoded, PixelFormat, Rectangle, RfbInStream, ENCODING_DESKTOP_SIZE, ENCODING_RAW,
    ENCODING_ZLIB,
};
use std::env;
use std::io::{Cursor, Write};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .init();

    let mut session = Session::new(&config, 64, 64, PixelFormat::rgb888())?;
    let wire = synthesize_update()?;
    info!("Decoding {} bytes of FramebufferUpdate", wire.len());

    let mut stream = RfbInStream::new(Cursor::new(wire));
    let updates = match session.apply_update_stream(&mut stream).await {
        Ok(updates) => updates,
        Err(e) => {
            warn!("Update failed (fatal={}): {}", e.is_fatal(), e);
            return Err(e.into());
        }
    };

    for update in &updates {
        let r = &update.rect;
        match &update.decoded {
            Decoded::Pixels(colors) => info!(
                "Rect [{},{} {}x{}] encoding={}: {} pixels, first={:?}",
                r.x,
                r.y,
                r.width,
                r.height,
                r.encoding,
                colors.len(),
                colors.first()
            ),
            Decoded::DesktopSize { width, height } => {
                info!("Desktop resized to {}x{}", width, height)
            }
        }
    }

    let zlib = session.context().zlib_stream();
    info!(
        "Session done: size={:?}, zlib in={} out={} pending={}",
        session.size(),
        zlib.total_in(),
        zlib.total_out(),
        zlib.pending_len()
    );
    Ok(())
}

/// Build one FramebufferUpdate body: a raw gradient row, two zlib rectangles
/// continuing one stream, and a desktop resize.
fn synthesize_update() -> anyhow::Result<Vec<u8>> {
    let gradient: Vec<u8> = (0..16u8).flat_map(|i| [i * 16, 0, 255 - i * 16, 0]).collect();
    let solid: Vec<u8> = [0x20, 0x80, 0xE0, 0x00].repeat(32);

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&solid)?;
    encoder.flush()?;
    let split = encoder.get_ref().len();
    encoder.write_all(&gradient)?;
    encoder.flush()?;
    let compressed = encoder.get_ref().clone();
    let (first, second) = compressed.split_at(split);

    let mut wire = vec![0u8];
    wire.extend_from_slice(&4u16.to_be_bytes());
    push_rect(&mut wire, 0, 0, 16, 1, ENCODING_RAW, &gradient);
    push_rect(&mut wire, 0, 1, 8, 4, ENCODING_ZLIB, &framed(first));
    push_rect(&mut wire, 0, 5, 16, 1, ENCODING_ZLIB, &framed(second));
    push_rect(&mut wire, 0, 0, 128, 96, ENCODING_DESKTOP_SIZE, &[]);
    Ok(wire)
}

fn framed(chunk: &[u8]) -> Vec<u8> {
    let mut out = (chunk.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(chunk);
    out
}

fn push_rect(wire: &mut Vec<u8>, x: u16, y: u16, w: u16, h: u16, encoding: i32, payload: &[u8]) {
    let rect = Rectangle {
        x,
        y,
        width: w,
        height: h,
        encoding,
    };
    wire.extend_from_slice(&rect.x.to_be_bytes());
    wire.extend_from_slice(&rect.y.to_be_bytes());
    wire.extend_from_slice(&rect.width.to_be_bytes());
    wire.extend_from_slice(&rect.height.to_be_bytes());
    wire.extend_from_slice(&rect.encoding.to_be_bytes());
    wire.extend_from_slice(payload);
}
