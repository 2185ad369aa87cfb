//! Session layer for decoding RFB (VNC) server streams.
//!
//! This crate ties the low-level `rfb-protocol` parsers and `rfb-encodings`
//! decoders into a per-connection [`Session`]: it owns the decoding context,
//! restricts decoding to the encodings the [`Config`] enables, and maps
//! failures into one [`RfbClientError`] type.
//!
//! # Features
//!
//! - **Async I/O**: Decodes from any tokio `AsyncRead`
//! - **Encodings**: Raw, Zlib (one persistent stream per connection), DesktopSize
//! - **Configuration management**: TOML files with validated defaults
//! - **Fail-fast policy**: Clear error messages, no defensive fallbacks, no
//!   partial results
//!
//! # Quick Start
//!
//! ```no_run
//! use rfb_client::{Config, Session};
//! use rfb_encodings::{PixelFormat, RfbInStream};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::builder().encodings([6, 0, -223]).build()?;
//!     let mut session = Session::new(&config, 1024, 768, PixelFormat::rgb888())?;
//!
//!     // Bytes following a FramebufferUpdate message-type byte
//!     let mut stream = RfbInStream::new(tokio::io::stdin());
//!     for update in session.apply_update_stream(&mut stream).await? {
//!         println!("{:?} -> {:?}", update.rect, update.decoded.colors().map(<[_]>::len));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Errors are categorized as either:
//! - **Fatal**: The stream position is unknown or the zlib stream is broken;
//!   the connection must be dropped
//! - **Non-fatal**: A palette miss or rejected color map write; the stream is
//!   still aligned on the next message
//!
//! # Safety
//!
//! This crate is `#![forbid(unsafe_code)]` and uses only safe Rust.

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod errors;
pub mod session;

// Re-exports
pub use config::{Config, ConfigBuilder, DecodingConfig, LoggingConfig};
pub use errors::RfbClientError;
pub use session::{RectUpdate, Session};
