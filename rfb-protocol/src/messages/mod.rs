//! RFB protocol message types.
//!
//! - **Core types** ([`types`]) - PixelFormat, Rectangle and encoding constants
//! - **Server messages** ([`server`]) - Server-to-client messages the decoders depend on
//!
//! # Wire Format Rules
//!
//! 1. **Big-endian byte order** - All multi-byte protocol integers use network byte order
//! 2. **Strict boolean validation** - Boolean fields must be exactly 0 or 1
//! 3. **Padding validation** - Padding bytes in PixelFormat must be zero
//! 4. **Fail-fast errors** - Invalid data results in errors, no defensive fallbacks
//!
//! Rectangle headers are parsed here; their payloads are consumed by the
//! decoders in `rfb-encodings`.

pub mod server;
pub mod types;

#[cfg(test)]
mod proptest_framing;

pub use server::SetColorMapEntries;
pub use types::{PixelFormat, Rectangle, ENCODING_DESKTOP_SIZE, ENCODING_RAW, ENCODING_ZLIB};
