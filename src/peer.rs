//! Top-level driver for one peer process.
//!
//! A [`Peer`] owns at most one [`TcpSession`]. It establishes the session for
//! its role, runs the handshake, and closes the session afterwards whatever
//! the result. Errors come back as values; deciding the exit status is left
//! to the caller.

use crate::config::Config;
use crate::error::{DhError, Result};
use crate::protocol::{CompletedHandshake, Handshake, HandshakeOutcome};
use crate::transport::{dial, Acceptor, TcpSession};

/// How a peer run ended without a fatal error.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Public values exchanged.
    Exchanged(CompletedHandshake),
    /// The proposal was refused or answered with something unexpected.
    NotAcknowledged {
        /// The responder's reply, verbatim
        reply: String,
    },
    /// No initiator connected within the accept window.
    TimedOut,
}

/// A peer with its single connection slot.
#[derive(Debug)]
pub struct Peer {
    config: Config,
    session: Option<TcpSession>,
}

impl Peer {
    /// Create a peer with no connection.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a session has been established
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Bind the configured address and wait for one initiator.
    pub async fn listen(&mut self) -> Result<()> {
        self.ensure_vacant()?;
        let acceptor = Acceptor::bind(self.config.peer.listen_addr()).await?;
        self.listen_with(acceptor).await
    }

    /// Wait for one initiator on an already bound acceptor.
    pub async fn listen_with(&mut self, acceptor: Acceptor) -> Result<()> {
        self.ensure_vacant()?;
        let session = acceptor.accept(self.config.peer.accept_timeout()).await?;
        self.session = Some(session);
        Ok(())
    }

    /// Dial `host` on the configured port.
    pub async fn connect(&mut self, host: &str) -> Result<()> {
        self.ensure_vacant()?;
        let session = dial(host, self.config.peer.port).await?;
        self.session = Some(session);
        Ok(())
    }

    /// Passive mode: listen, then answer the handshake.
    pub async fn run_passive(&mut self) -> Result<Outcome> {
        match self.listen().await {
            Ok(()) => self.handshake().await,
            Err(DhError::TimedOut(_)) => Ok(Outcome::TimedOut),
            Err(e) => Err(e),
        }
    }

    /// Passive mode on an already bound acceptor.
    pub async fn run_passive_with(&mut self, acceptor: Acceptor) -> Result<Outcome> {
        match self.listen_with(acceptor).await {
            Ok(()) => self.handshake().await,
            Err(DhError::TimedOut(_)) => Ok(Outcome::TimedOut),
            Err(e) => Err(e),
        }
    }

    /// Active mode: dial `host`, then propose.
    pub async fn run_active(&mut self, host: &str) -> Result<Outcome> {
        self.connect(host).await?;
        self.handshake().await
    }

    /// Run the handshake on the established session and close it.
    pub async fn handshake(&mut self) -> Result<Outcome> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| DhError::Connection("No session established".to_string()))?;

        let mut handshake = Handshake::new(self.config.handshake.clone());
        let outcome = handshake.run(session).await;

        let stats = session.stats();
        tracing::debug!(
            frames_sent = stats.frames_sent,
            frames_received = stats.frames_received,
            state = ?handshake.state(),
            "Handshake finished"
        );
        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close session: {}", e);
        }

        match outcome? {
            HandshakeOutcome::Completed(done) => {
                match done.shared_secret() {
                    Ok(secret) => tracing::trace!("Shared secret: {}", secret),
                    Err(e) => tracing::warn!("Cannot derive shared secret: {}", e),
                }
                Ok(Outcome::Exchanged(done))
            },
            HandshakeOutcome::NotAcknowledged { reply } => Ok(Outcome::NotAcknowledged { reply }),
        }
    }

    /// Close the session if one is open.
    pub async fn close(&mut self) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => session.close().await,
            None => Ok(()),
        }
    }

    fn ensure_vacant(&self) -> Result<()> {
        if self.session.is_some() {
            tracing::warn!("Socket already exists. Only one connection allowed.");
            return Err(DhError::SessionExists);
        }
        Ok(())
    }
}
