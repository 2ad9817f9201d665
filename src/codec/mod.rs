//! Message codec for the handshake wire protocol.
//!
//! Frames are whitespace-delimited ASCII, one per line:
//!
//! | Frame      | Direction           | Meaning                      |
//! |------------|---------------------|------------------------------|
//! | `PROP a n` | Initiator→Responder | propose generator and modulus|
//! | `ACK`      | Responder→Initiator | proposal accepted            |
//! | `NAK`      | Responder→Initiator | proposal rejected            |
//! | `KEY v`    | either direction    | sender's public value        |
//!
//! [`Frame`] handles the text form; [`FrameReader`] and [`FrameWriter`]
//! move frames over any async byte stream.

mod frame;
mod stream;

pub use frame::{Frame, FrameTag};
pub use stream::{FrameReader, FrameWriter};

/// Longest accepted frame line, terminator excluded.
pub const MAX_FRAME_LEN: usize = 1024;
