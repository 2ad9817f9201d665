//! Protocol frames and their textual wire format.

use std::fmt;
use std::str::FromStr;

use crate::error::{DhError, Result};

/// Operation tag: the first token of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTag {
    /// Proposal of generator and modulus
    Prop,
    /// Proposal accepted
    Ack,
    /// Proposal rejected
    Nak,
    /// Public value
    Key,
}

impl FrameTag {
    /// Wire spelling of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prop => "PROP",
            Self::Ack => "ACK",
            Self::Nak => "NAK",
            Self::Key => "KEY",
        }
    }
}

impl fmt::Display for FrameTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameTag {
    type Err = DhError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PROP" => Ok(Self::Prop),
            "ACK" => Ok(Self::Ack),
            "NAK" => Ok(Self::Nak),
            "KEY" => Ok(Self::Key),
            _ => Err(DhError::Protocol(format!("Unknown frame tag: {s}"))),
        }
    }
}

/// One protocol message.
///
/// Integers are signed so that a non-positive proposal still decodes and can
/// be answered with `NAK` instead of failing as garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// `PROP <a> <n>`
    Prop {
        /// Generator `a`
        generator: i64,
        /// Modulus `n`
        modulus: i64,
    },
    /// `ACK`
    Ack,
    /// `NAK`
    Nak,
    /// `KEY <value>`
    Key(i64),
}

impl Frame {
    /// Tag of this frame.
    pub fn tag(&self) -> FrameTag {
        match self {
            Self::Prop { .. } => FrameTag::Prop,
            Self::Ack => FrameTag::Ack,
            Self::Nak => FrameTag::Nak,
            Self::Key(_) => FrameTag::Key,
        }
    }

    /// Encode as one newline-terminated line.
    pub fn encode(&self) -> String {
        format!("{self}\n")
    }

    /// Extract `(generator, modulus)` or fail if this is not a `PROP`.
    pub fn expect_prop(self) -> Result<(i64, i64)> {
        match self {
            Self::Prop { generator, modulus } => Ok((generator, modulus)),
            other => Err(unexpected(FrameTag::Prop, other.tag())),
        }
    }

    /// Extract the public value or fail if this is not a `KEY`.
    pub fn expect_key(self) -> Result<i64> {
        match self {
            Self::Key(value) => Ok(value),
            other => Err(unexpected(FrameTag::Key, other.tag())),
        }
    }
}

fn unexpected(expected: FrameTag, got: FrameTag) -> DhError {
    DhError::Protocol(format!("Expected {expected} frame, got {got}"))
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prop { generator, modulus } => write!(f, "PROP {generator} {modulus}"),
            Self::Ack => f.write_str("ACK"),
            Self::Nak => f.write_str("NAK"),
            Self::Key(value) => write!(f, "KEY {value}"),
        }
    }
}

impl FromStr for Frame {
    type Err = DhError;

    fn from_str(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let tag: FrameTag = tokens
            .next()
            .ok_or_else(|| DhError::Protocol("Empty frame".to_string()))?
            .parse()?;
        let fields: Vec<&str> = tokens.collect();

        let arity = match tag {
            FrameTag::Prop => 2,
            FrameTag::Key => 1,
            FrameTag::Ack | FrameTag::Nak => 0,
        };
        if fields.len() != arity {
            return Err(DhError::Protocol(format!(
                "{tag} frame takes {arity} field(s), got {}",
                fields.len()
            )));
        }

        let frame = match tag {
            FrameTag::Prop => Self::Prop {
                generator: parse_int(tag, fields[0])?,
                modulus: parse_int(tag, fields[1])?,
            },
            FrameTag::Key => Self::Key(parse_int(tag, fields[0])?),
            FrameTag::Ack => Self::Ack,
            FrameTag::Nak => Self::Nak,
        };
        Ok(frame)
    }
}

fn parse_int(tag: FrameTag, field: &str) -> Result<i64> {
    field
        .parse()
        .map_err(|e| DhError::Protocol(format!("Invalid integer '{field}' in {tag} frame: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode() {
        let prop = Frame::Prop {
            generator: 5,
            modulus: 23,
        };
        assert_eq!(prop.encode(), "PROP 5 23\n");
        assert_eq!(Frame::Ack.encode(), "ACK\n");
        assert_eq!(Frame::Nak.encode(), "NAK\n");
        assert_eq!(Frame::Key(19).encode(), "KEY 19\n");
    }

    #[test]
    fn test_decode_tolerates_extra_whitespace() {
        let frame: Frame = "  PROP   53\t123457 \r".parse().unwrap();
        assert_eq!(
            frame,
            Frame::Prop {
                generator: 53,
                modulus: 123457
            }
        );
    }

    #[test]
    fn test_decode_negative_proposal() {
        let frame: Frame = "PROP -1 23".parse().unwrap();
        assert_eq!(frame.expect_prop().unwrap(), (-1, 23));
    }

    #[test]
    fn test_decode_errors() {
        for line in [
            "",
            "HELLO",
            "prop 5 23",
            "PROP 5",
            "PROP 5 23 7",
            "PROP five 23",
            "ACK now",
            "KEY",
            "KEY 1.5",
            "KEY 99999999999999999999",
        ] {
            assert!(
                matches!(line.parse::<Frame>(), Err(DhError::Protocol(_))),
                "expected protocol error for {line:?}"
            );
        }
    }

    #[test]
    fn test_expect_wrong_tag() {
        let err = Frame::Ack.expect_key().unwrap_err();
        assert_eq!(err.to_string(), "Protocol error: Expected KEY frame, got ACK");
        assert!(Frame::Key(3).expect_prop().is_err());
    }

    fn any_frame() -> impl Strategy<Value = Frame> {
        prop_oneof![
            (any::<i64>(), any::<i64>())
                .prop_map(|(generator, modulus)| Frame::Prop { generator, modulus }),
            Just(Frame::Ack),
            Just(Frame::Nak),
            any::<i64>().prop_map(Frame::Key),
        ]
    }

    proptest! {
        #[test]
        fn prop_round_trip(frame in any_frame()) {
            let decoded: Frame = frame.encode().parse().unwrap();
            prop_assert_eq!(decoded, frame);
        }
    }
}
