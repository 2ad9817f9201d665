//! Session transport for the handshake.
//!
//! A [`Session`] owns exactly one established connection, split into a
//! receiving and a sending half so both directions can be driven at the same
//! time during the key exchange.
//!
//! # Establishment
//!
//! ```text
//! Responder                              Initiator
//!    |  Acceptor::bind(port)                 |
//!    |  accept(timeout) ...                  |
//!    |<------------- TCP connect ------------|  dial(host, port)
//!    |  listener dropped                     |
//!    v                                       v
//! Session(Responder)                  Session(Initiator)
//! ```
//!
//! The listener only ever accepts one connection. It is released when
//! [`Acceptor::accept`] returns, whether a peer arrived or not.

mod tcp;

pub use tcp::{accept_with_timeout, dial, Acceptor, TcpSession};

use std::fmt;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::codec::{Frame, FrameReader, FrameWriter};
use crate::error::{DhError, Result};

/// Which side of the handshake a peer plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Listens and answers the proposal.
    Responder,
    /// Dials and proposes the parameters.
    Initiator,
}

impl Role {
    /// Get descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Responder => "responder",
            Self::Initiator => "initiator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One established connection to the peer.
#[derive(Debug)]
pub struct Session<R, W> {
    role: Role,
    peer_addr: Option<SocketAddr>,
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    closed: bool,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Build a session over an arbitrary pair of stream halves.
    pub fn from_parts(role: Role, reader: R, writer: W) -> Self {
        Self {
            role,
            peer_addr: None,
            reader: FrameReader::new(reader),
            writer: FrameWriter::new(writer),
            closed: false,
        }
    }

    /// Record the remote address for diagnostics.
    pub fn with_peer_addr(mut self, addr: SocketAddr) -> Self {
        self.peer_addr = Some(addr);
        self
    }

    /// Role this session was established for.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Remote address, when the session runs over a socket.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Send one frame.
    pub async fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        self.ensure_open()?;
        tracing::debug!(role = %self.role, "Sending: {}", frame);
        self.writer.write_frame(frame).await
    }

    /// Wait for one line from the peer, undecoded.
    pub async fn receive_line(&mut self) -> Result<String> {
        self.ensure_open()?;
        let line = self.reader.read_line().await?;
        tracing::debug!(role = %self.role, "Received data by peer: {}", line);
        Ok(line)
    }

    /// Wait for one frame from the peer.
    pub async fn receive_frame(&mut self) -> Result<Frame> {
        self.receive_line().await?.parse()
    }

    /// Borrow the receiving and sending halves independently.
    pub fn split_mut(&mut self) -> Result<(&mut FrameReader<R>, &mut FrameWriter<W>)> {
        self.ensure_open()?;
        Ok((&mut self.reader, &mut self.writer))
    }

    /// Release the connection. Calling it again does nothing.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        tracing::debug!(role = %self.role, "Closing session");
        match self.writer.shutdown().await {
            // Peer already gone
            Err(DhError::Io(e)) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }

    /// Frame counters for this session.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            role: self.role,
            frames_sent: self.writer.frames_written(),
            frames_received: self.reader.lines_read(),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(DhError::Connection("Session is closed".to_string()));
        }
        Ok(())
    }
}

/// Session statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Role of the session
    pub role: Role,
    /// Frames written to the peer
    pub frames_sent: u64,
    /// Lines read from the peer
    pub frames_received: u64,
}
