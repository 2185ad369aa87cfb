//! Buffered input stream for RFB protocol data.
//!
//! [`RfbInStream`] wraps any tokio [`AsyncRead`] and offers typed reads in
//! network byte order plus a bounded copy used by length-prefixed payloads.
//!
//! # Examples
//!
//! ```no_run
//! use rfb_protocol::io::RfbInStream;
//!
//! # async fn example<R: tokio::io::AsyncRead + Unpin>(reader: R) -> std::io::Result<()> {
//! let mut input = RfbInStream::new(reader);
//! let x = input.read_u16().await?;
//! let y = input.read_u16().await?;
//! let encoding = input.read_i32().await?;
//! # Ok(())
//! # }
//! ```

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Buffered input stream for reading RFB protocol data.
///
/// Multi-byte integers are read big-endian. Data is pulled from the
/// underlying reader into an internal buffer (8KB by default) on demand.
///
/// # Examples
///
/// ```no_run
/// use rfb_protocol::io::RfbInStream;
/// # async fn example<R: tokio::io::AsyncRead + Unpin>(reader: R) -> std::io::Result<()> {
/// let mut stream = RfbInStream::new(reader);
///
/// // Zlib rectangle: 4-byte length then that many bytes
/// let len = stream.read_u32().await?;
/// let mut chunk = bytes::BytesMut::new();
/// let copied = stream.read_up_to(&mut chunk, len as usize).await?;
/// assert_eq!(copied, len as usize);
/// # Ok(())
/// # }
/// ```
pub struct RfbInStream<R> {
    reader: R,
    buffer: BytesMut,
}

impl<R: AsyncRead + Unpin> RfbInStream<R> {
    /// Create a new input stream with default buffer size (8KB).
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, 8192)
    }

    /// Create a new input stream with specified buffer capacity.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Pull more bytes from the reader. Returns the number read (0 at EOF).
    async fn fill(&mut self) -> std::io::Result<usize> {
        self.reader.read_buf(&mut self.buffer).await
    }

    /// Ensure at least `n` bytes are available in the buffer.
    ///
    /// Returns `UnexpectedEof` if the reader ends first.
    async fn ensure_bytes(&mut self, n: usize) -> std::io::Result<()> {
        while self.buffer.len() < n {
            if self.fill().await? == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("expected {} bytes, got {}", n, self.buffer.len()),
                ));
            }
        }
        Ok(())
    }

    /// Read a single byte (u8).
    pub async fn read_u8(&mut self) -> std::io::Result<u8> {
        self.ensure_bytes(1).await?;
        Ok(self.buffer.get_u8())
    }

    /// Read a 16-bit unsigned integer in network byte order (big-endian).
    pub async fn read_u16(&mut self) -> std::io::Result<u16> {
        self.ensure_bytes(2).await?;
        Ok(self.buffer.get_u16())
    }

    /// Read a 32-bit unsigned integer in network byte order (big-endian).
    pub async fn read_u32(&mut self) -> std::io::Result<u32> {
        self.ensure_bytes(4).await?;
        Ok(self.buffer.get_u32())
    }

    /// Read a 32-bit signed integer in network byte order (big-endian).
    pub async fn read_i32(&mut self) -> std::io::Result<i32> {
        self.ensure_bytes(4).await?;
        Ok(self.buffer.get_i32())
    }

    /// Read exactly `buf.len()` bytes into the provided buffer.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if the reader ends before the buffer is filled.
    /// Nothing is consumed from the internal buffer in that case.
    pub async fn read_bytes(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        self.ensure_bytes(buf.len()).await?;
        self.buffer.copy_to_slice(buf);
        Ok(())
    }

    /// Append up to `n` bytes to `dst`, stopping early only at EOF.
    ///
    /// Never consumes more than `n` bytes, so bytes of the next protocol
    /// message stay in the stream. Returns how many bytes were copied; a
    /// value below `n` means the reader ended.
    pub async fn read_up_to(&mut self, dst: &mut BytesMut, n: usize) -> std::io::Result<usize> {
        let mut copied = 0;
        while copied < n {
            if self.buffer.is_empty() && self.fill().await? == 0 {
                break;
            }
            let take = (n - copied).min(self.buffer.len());
            dst.extend_from_slice(&self.buffer.split_to(take));
            copied += take;
        }
        Ok(copied)
    }

    /// Skip `n` bytes in the stream.
    pub async fn skip(&mut self, n: usize) -> std::io::Result<()> {
        self.ensure_bytes(n).await?;
        self.buffer.advance(n);
        Ok(())
    }

    /// Number of bytes that can be read without performing I/O.
    pub fn available(&self) -> usize {
        self.buffer.len()
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Consume the stream and return the underlying reader.
    ///
    /// Bytes already buffered are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
