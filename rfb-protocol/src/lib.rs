//! RFB (Remote Framebuffer) protocol primitives for the decoding core.
//!
//! # Modules
//!
//! - [`io`] - Buffered input stream ([`RfbInStream`])
//! - [`messages`] - Wire types (PixelFormat, Rectangle) and server messages
//!
//! # Examples
//!
//! ```no_run
//! use rfb_protocol::{RfbInStream, Rectangle};
//!
//! # async fn example<R: tokio::io::AsyncRead + Unpin>(reader: R) -> std::io::Result<()> {
//! let mut input = RfbInStream::new(reader);
//! let rect = Rectangle::read_from(&mut input).await?;
//! println!("{}x{} encoding {}", rect.width, rect.height, rect.encoding);
//! # Ok(())
//! # }
//! ```

pub mod io;
pub mod messages;

// Re-export commonly used types
pub use io::RfbInStream;
pub use messages::{PixelFormat, Rectangle, SetColorMapEntries};
