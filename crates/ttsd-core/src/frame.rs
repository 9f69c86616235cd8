//! Length-prefixed binary framing for the audio output stream.
//!
//! ```text
//!   [u32 BE length N][N bytes payload]   audio frame (N > 0)
//!   [00 00 00 00]                        end of one generation
//! ```
//!
//! Every frame is flushed as soon as it is written so the host sees audio
//! without buffering delay. The zero-length frame is reserved for the end
//! marker, so [`FrameWriter::write_audio`] refuses empty payloads.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the big-endian length prefix.
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// The end-of-generation frame as it appears on the wire.
pub const END_MARKER: [u8; LENGTH_PREFIX_BYTES] = [0; LENGTH_PREFIX_BYTES];

/// Errors raised while writing or reading frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Audio frames must carry at least one byte.
    #[error("Audio frame payload must not be empty")]
    EmptyPayload,

    /// Payload does not fit the 32-bit length prefix.
    #[error("Frame payload of {0} bytes exceeds the 32-bit length prefix")]
    PayloadTooLarge(usize),

    /// The stream ended in the middle of a length prefix.
    #[error("Stream ended inside a frame length prefix ({0} of 4 bytes read)")]
    TruncatedPrefix(usize),

    /// Underlying stream failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// PCM payload of one audio chunk.
    Audio(Vec<u8>),

    /// End of one generation.
    End,
}

/// Encode one audio frame into a byte vector (prefix + payload).
///
/// An empty payload encodes as the end marker. This is the raw codec used by
/// [`read_frame`] round-trips; the writer adds the empty-payload guard.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = length_prefix(payload.len())?;
    let mut bytes = Vec::with_capacity(LENGTH_PREFIX_BYTES + payload.len());
    bytes.extend_from_slice(&len.to_be_bytes());
    bytes.extend_from_slice(payload);
    Ok(bytes)
}

fn length_prefix(len: usize) -> Result<u32, FrameError> {
    u32::try_from(len).map_err(|_| FrameError::PayloadTooLarge(len))
}

// ============================================================================
// Writer
// ============================================================================

/// Writes frames to an async byte sink, flushing after each one.
#[derive(Debug)]
pub struct FrameWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Wrap a writer (typically `tokio::io::stdout()`).
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write one audio frame and flush.
    pub async fn write_audio(&mut self, payload: &[u8]) -> Result<(), FrameError> {
        if payload.is_empty() {
            return Err(FrameError::EmptyPayload);
        }
        let len = length_prefix(payload.len())?;

        self.inner.write_all(&len.to_be_bytes()).await?;
        self.inner.write_all(payload).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Write the zero-length end-of-generation frame and flush.
    pub async fn write_end(&mut self) -> Result<(), FrameError> {
        self.inner.write_all(&END_MARKER).await?;
        self.inner.flush().await?;
        tracing::trace!("End-of-generation frame written");
        Ok(())
    }

    /// Borrow the underlying writer.
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Read the next frame from `reader`.
///
/// Returns `Ok(None)` when the stream ends cleanly on a frame boundary.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Frame>, FrameError> {
    let mut prefix = [0u8; LENGTH_PREFIX_BYTES];
    let mut filled = 0;

    while filled < LENGTH_PREFIX_BYTES {
        let n = reader.read(&mut prefix[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(FrameError::TruncatedPrefix(filled));
        }
        filled += n;
    }

    let len = u32::from_be_bytes(prefix) as usize;
    if len == 0 {
        return Ok(Some(Frame::End));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(Frame::Audio(payload)))
}
