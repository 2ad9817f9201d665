//! Handshake state machine for both roles.
//!
//! Drives PROP/ACK/NAK over a [`Session`], then hands off to
//! [`exchange_keys`] for the concurrent KEY step.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::io::{AsyncRead, AsyncWrite};

use super::exchange::exchange_keys;
use super::keys::{ExchangeResult, KeyExchange, Proposal};
use crate::codec::Frame;
use crate::config::HandshakeConfig;
use crate::error::{DhError, Result};
use crate::transport::{Role, Session};

/// Handshake state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Nothing done yet
    Initial,
    /// Responder: waiting for PROP
    WaitForProp,
    /// Responder: checking the proposed parameters
    Validate,
    /// Responder: proposal refused with NAK (terminal)
    Rejected,
    /// Responder: ACK sent
    Accepted,
    /// Initiator: sending PROP
    Propose,
    /// Initiator: waiting for ACK
    WaitAck,
    /// Initiator: peer did not acknowledge (terminal)
    NotAcknowledged,
    /// Both: exchanging KEY frames
    Exchanging,
    /// Both: exchange complete (terminal)
    Done,
}

/// Key material and public values from a completed handshake.
#[derive(Debug, Clone)]
pub struct CompletedHandshake {
    /// Our side's parameters and secret
    pub keys: KeyExchange,
    /// Both public values
    pub result: ExchangeResult,
}

impl CompletedHandshake {
    /// Derive the shared secret from this exchange.
    pub fn shared_secret(&self) -> Result<i64> {
        self.keys.shared_secret(&self.result)
    }
}

/// How a handshake ended when it did not fail.
#[derive(Debug, Clone)]
pub enum HandshakeOutcome {
    /// Both public values were exchanged.
    Completed(CompletedHandshake),
    /// The responder answered the proposal with something other than `ACK`.
    NotAcknowledged {
        /// The responder's reply, verbatim
        reply: String,
    },
}

/// One handshake attempt.
#[derive(Debug)]
pub struct Handshake<G = StdRng> {
    config: HandshakeConfig,
    rng: G,
    state: HandshakeState,
}

impl Handshake<StdRng> {
    /// Create a handshake drawing randomness from the OS-seeded generator.
    pub fn new(config: HandshakeConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<G: Rng> Handshake<G> {
    /// Create a handshake with a caller-provided generator.
    pub fn with_rng(config: HandshakeConfig, rng: G) -> Self {
        Self {
            config,
            rng,
            state: HandshakeState::Initial,
        }
    }

    /// Current state
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Run the flow matching the session's role.
    pub async fn run<R, W>(&mut self, session: &mut Session<R, W>) -> Result<HandshakeOutcome>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        match session.role() {
            Role::Responder => self.respond(session).await.map(HandshakeOutcome::Completed),
            Role::Initiator => self.initiate(session).await,
        }
    }

    /// Responder flow: wait for PROP, validate, ACK or NAK, then exchange.
    pub async fn respond<R, W>(&mut self, session: &mut Session<R, W>) -> Result<CompletedHandshake>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.state = HandshakeState::WaitForProp;
        let (generator, modulus) = session.receive_frame().await?.expect_prop()?;

        self.state = HandshakeState::Validate;
        let proposal = match Proposal::new(generator, modulus) {
            Ok(proposal) => proposal,
            Err(e) => {
                tracing::warn!(generator, modulus, "Rejecting proposal");
                session.send_frame(&Frame::Nak).await?;
                self.state = HandshakeState::Rejected;
                return Err(e);
            },
        };

        session.send_frame(&Frame::Ack).await?;
        self.state = HandshakeState::Accepted;
        tracing::info!(generator, modulus, "Proposal accepted");

        let keys = KeyExchange::generate(proposal, &self.config, &mut self.rng)?;
        self.exchange(session, keys).await
    }

    /// Initiator flow: propose, wait for ACK, then exchange.
    ///
    /// Anything other than `ACK` ends the handshake early without an error.
    pub async fn initiate<R, W>(&mut self, session: &mut Session<R, W>) -> Result<HandshakeOutcome>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.state = HandshakeState::Propose;
        let proposal = Proposal::choose(&self.config, &mut self.rng)?;
        session.send_frame(&proposal.to_frame()).await?;

        self.state = HandshakeState::WaitAck;
        let reply = match session.receive_line().await {
            Ok(line) => line,
            Err(DhError::Protocol(reason)) => {
                self.state = HandshakeState::NotAcknowledged;
                tracing::warn!(%reason, "The proposal was not acknowledged.");
                return Ok(HandshakeOutcome::NotAcknowledged {
                    reply: format!("<unreadable reply: {reason}>"),
                });
            },
            Err(e) => return Err(e),
        };
        if !matches!(reply.parse::<Frame>(), Ok(Frame::Ack)) {
            self.state = HandshakeState::NotAcknowledged;
            tracing::warn!(%reply, "The proposal was not acknowledged.");
            return Ok(HandshakeOutcome::NotAcknowledged { reply });
        }
        tracing::info!(
            generator = proposal.generator(),
            modulus = proposal.modulus(),
            "The proposal was acknowledged."
        );

        let keys = KeyExchange::generate(proposal, &self.config, &mut self.rng)?;
        self.exchange(session, keys)
            .await
            .map(HandshakeOutcome::Completed)
    }

    async fn exchange<R, W>(
        &mut self,
        session: &mut Session<R, W>,
        keys: KeyExchange,
    ) -> Result<CompletedHandshake>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.state = HandshakeState::Exchanging;
        let result = exchange_keys(session, keys.public_value()).await?;
        self.state = HandshakeState::Done;
        tracing::info!(ours = result.ours, theirs = result.theirs, "Key exchange complete");
        Ok(CompletedHandshake { keys, result })
    }
}
