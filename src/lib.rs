//! # dh-peer - Two-Party Diffie-Hellman Handshake
//!
//! Unauthenticated Diffie-Hellman key exchange between two peers over one
//! direct TCP connection. One peer listens (responder), the other dials
//! (initiator).
//!
//! ## Protocol Overview
//!
//! ```text
//! Initiator                          Responder
//!    |                                   |
//!    |-------- PROP a n --------------->|
//!    |<------- ACK / NAK ---------------|
//!    |                                   |
//!    |======== KEY (both at once) ======|
//! ```
//!
//! ### State Machine
//!
//! ```text
//!   Responder                                  Initiator
//!
//!   [WaitForProp]                              [Propose]
//!        │ PROP a n                                │ send PROP
//!        v                                         v
//!   [Validate] ── a<=0 or n<=0 ──> [Rejected]  [WaitAck] ── not ACK ──> [NotAcknowledged]
//!        │ send ACK                                │ ACK
//!        v                                         v
//!   [Accepted] ──────────> [Exchanging] <──────────┘
//!                               │ KEY sent and KEY received
//!                               v
//!                            [Done]
//! ```
//!
//! ### Wire Format
//!
//! | Frame      | Direction           | Meaning                       |
//! |------------|---------------------|-------------------------------|
//! | `PROP a n` | Initiator→Responder | propose generator and modulus |
//! | `ACK`      | Responder→Initiator | proposal accepted             |
//! | `NAK`      | Responder→Initiator | proposal rejected             |
//! | `KEY v`    | either direction    | sender's public value         |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dh_peer::{Config, Outcome, Peer};
//!
//! let mut peer = Peer::new(Config::default());
//! match peer.run_active("192.0.2.10").await? {
//!     Outcome::Exchanged(done) => println!("theirs = {}", done.result.theirs),
//!     Outcome::NotAcknowledged { reply } => println!("refused: {reply}"),
//!     Outcome::TimedOut => unreachable!("only passive peers time out"),
//! }
//! ```
//!
//! ## Modules
//!
//! - [`modexp`]: Arbitrary-precision modular exponentiation
//! - [`codec`]: Frame encoding and newline framing
//! - [`transport`]: Session establishment and frame I/O
//! - [`protocol`]: Handshake state machine and key exchange
//! - [`peer`]: Process-level driver
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod codec;
pub mod config;
pub mod error;
pub mod modexp;
pub mod peer;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use codec::{Frame, FrameTag};
pub use config::Config;
pub use error::{DhError, Result};
pub use modexp::modexp;
pub use peer::{Outcome, Peer};
pub use protocol::{ExchangeResult, Handshake, HandshakeOutcome, HandshakeState, KeyExchange};
pub use transport::{Role, Session, TcpSession};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
