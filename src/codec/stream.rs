//! Newline framing over async byte streams.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::{Frame, MAX_FRAME_LEN};
use crate::error::{DhError, Result};

/// Reads one frame per line from the receiving half of a connection.
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: BufReader<R>,
    lines_read: u64,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Wrap a readable stream.
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
            lines_read: 0,
        }
    }

    /// Number of lines read so far.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Read one raw line without its terminator.
    ///
    /// Waits until a full line arrives. A final line cut off by EOF is still
    /// returned; EOF before any byte fails with [`DhError::ConnectionClosed`].
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let limit = MAX_FRAME_LEN as u64 + 1;
        let n = (&mut self.inner)
            .take(limit)
            .read_line(&mut line)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::InvalidData => {
                    DhError::Protocol("Frame is not valid UTF-8".to_string())
                },
                _ => DhError::Io(e),
            })?;

        if n == 0 {
            return Err(DhError::ConnectionClosed);
        }
        if !line.ends_with('\n') && n as u64 == limit {
            return Err(DhError::Protocol(format!(
                "Frame exceeds {MAX_FRAME_LEN} bytes"
            )));
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        self.lines_read += 1;
        Ok(line)
    }

    /// Read and decode one frame.
    pub async fn read_frame(&mut self) -> Result<Frame> {
        self.read_line().await?.parse()
    }
}

/// Writes encoded frames to the sending half of a connection.
#[derive(Debug)]
pub struct FrameWriter<W> {
    inner: W,
    frames_written: u64,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Wrap a writable stream.
    pub fn new(writer: W) -> Self {
        Self {
            inner: writer,
            frames_written: 0,
        }
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Write one frame and flush it to the transport.
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.inner.write_all(frame.encode().as_bytes()).await?;
        self.inner.flush().await?;
        self.frames_written += 1;
        Ok(())
    }

    /// Shut down the write direction.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner.shutdown().await?;
        Ok(())
    }
}
