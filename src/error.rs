//! Error types for the Diffie-Hellman peer.
//!
//! Every failure is detected where it happens (frame decode, arithmetic
//! precondition, connection I/O) and returned up to the driver. Nothing in
//! the library terminates the process.

use thiserror::Error;

/// Errors raised by the handshake engine and its transport.
#[derive(Error, Debug)]
pub enum DhError {
    /// No inbound connection arrived within the accept window.
    #[error("Timed out after {0} ms waiting for a peer")]
    TimedOut(u64),

    /// The transport could not establish or maintain the connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The peer closed the connection before a full frame arrived.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// A session is already established; only one connection is allowed.
    #[error("Session already exists, only one connection allowed")]
    SessionExists,

    /// A received frame was malformed or had the wrong tag for the state.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The responder received a non-positive generator or modulus.
    ///
    /// The peer has already been told with `NAK` when this is returned.
    #[error("Invalid proposal: generator {generator} and modulus {modulus} must be positive")]
    InvalidProposal {
        /// Proposed generator.
        generator: i64,
        /// Proposed modulus.
        modulus: i64,
    },

    /// Modular arithmetic precondition violated.
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for handshake operations
pub type Result<T> = std::result::Result<T, DhError>;

impl DhError {
    /// Whether this error aborts the run with a non-zero exit status.
    ///
    /// An accept timeout is reported but ends the process cleanly.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DhError::TimedOut(_))
    }
}

impl From<toml::de::Error> for DhError {
    fn from(err: toml::de::Error) -> Self {
        DhError::Config(format!("Failed to parse config: {err}"))
    }
}
