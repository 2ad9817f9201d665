//! Diffie-Hellman handshake protocol.
//!
//! # Message Flow
//!
//! ```text
//! Initiator                          Responder
//!    |                                   |
//!    |-------- PROP a n --------------->|  Propose generator and modulus
//!    |                                   |
//!    |<------- ACK ---------------------|  Parameters accepted
//!    |     or  NAK                       |  or rejected (a <= 0 or n <= 0)
//!    |                                   |
//!    |-------- KEY a^x mod n --------->|  Sent concurrently by both
//!    |<------- KEY a^y mod n ----------|
//! ```
//!
//! ## State Machine
//!
//! | Role      | States                                                         |
//! |-----------|----------------------------------------------------------------|
//! | Responder | `WaitForProp → Validate → {Rejected \| Accepted} → Exchanging → Done` |
//! | Initiator | `Propose → WaitAck → {NotAcknowledged \| Exchanging} → Done`   |
//!
//! The terminal output is an [`ExchangeResult`] holding both public values.
//! [`KeyExchange::shared_secret`] derives `theirs^x mod n` from it.

mod exchange;
mod handshake;
mod keys;

pub use exchange::exchange_keys;
pub use handshake::{CompletedHandshake, Handshake, HandshakeOutcome, HandshakeState};
pub use keys::{ExchangeResult, KeyExchange, PrivateExponent, Proposal};
