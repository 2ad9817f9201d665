//! TCP establishment for handshake sessions.
//!
//! The responder binds an [`Acceptor`] and waits a bounded time for exactly
//! one peer; the initiator calls [`dial`].

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use super::{Role, Session};
use crate::error::{DhError, Result};

/// Session over a TCP socket.
pub type TcpSession = Session<OwnedReadHalf, OwnedWriteHalf>;

/// Listening endpoint good for a single accept attempt.
#[derive(Debug)]
pub struct Acceptor {
    listener: TcpListener,
}

impl Acceptor {
    /// Bind the listening endpoint.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self> {
        tracing::info!("Starting up.");
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| DhError::Connection(format!("Failed to bind listener: {e}")))?;
        Ok(Self { listener })
    }

    /// Address the endpoint is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Wait up to `timeout` for one inbound connection.
    ///
    /// Consumes the acceptor: the listener is closed when this returns, so no
    /// further connections are taken regardless of the outcome.
    pub async fn accept(self, timeout: Duration) -> Result<TcpSession> {
        let local = self.local_addr()?;
        tracing::info!("Waiting at port {}", local.port());

        let accepted = tokio::time::timeout(timeout, self.listener.accept()).await;
        drop(self.listener);

        match accepted {
            Ok(Ok((stream, peer))) => {
                tracing::info!(%peer, "Socket connection accepted.");
                session_from_stream(Role::Responder, stream, peer)
            },
            Ok(Err(e)) => Err(DhError::Connection(format!("Accept failed: {e}"))),
            Err(_) => {
                let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!("A timeout occurred after {} ms. No connection possible.", millis);
                Err(DhError::TimedOut(millis))
            },
        }
    }
}

/// Bind `addr`, wait for one peer, and stop listening.
pub async fn accept_with_timeout(addr: impl ToSocketAddrs, timeout: Duration) -> Result<TcpSession> {
    Acceptor::bind(addr).await?.accept(timeout).await
}

/// Connect to a remote responder.
pub async fn dial(host: &str, port: u16) -> Result<TcpSession> {
    let stream = TcpStream::connect((host, port)).await.map_err(|e| {
        DhError::Connection(format!("Connection to peer {host}:{port} impossible: {e}"))
    })?;
    let peer = stream.peer_addr()?;
    tracing::info!(%peer, "Socket connection successfully established.");
    session_from_stream(Role::Initiator, stream, peer)
}

fn session_from_stream(role: Role, stream: TcpStream, peer: SocketAddr) -> Result<TcpSession> {
    stream.set_nodelay(true)?;
    let (reader, writer) = stream.into_split();
    Ok(Session::from_parts(role, reader, writer).with_peer_addr(peer))
}
