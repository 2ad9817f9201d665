//! Diffie-Hellman parameters, secrets and public values.

use std::fmt;

use rand::Rng;

use crate::codec::Frame;
use crate::config::HandshakeConfig;
use crate::error::{DhError, Result};
use crate::modexp::modexp;

/// Proposed domain parameters `(a, n)`. Both are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposal {
    generator: i64,
    modulus: i64,
}

impl Proposal {
    /// Validate a proposal received from or sent to the peer.
    pub fn new(generator: i64, modulus: i64) -> Result<Self> {
        if generator <= 0 || modulus <= 0 {
            return Err(DhError::InvalidProposal { generator, modulus });
        }
        Ok(Self { generator, modulus })
    }

    /// Pick the initiator's proposal: fixed values from `config` where set,
    /// otherwise sampled uniformly from the configured ranges.
    pub fn choose<G: Rng + ?Sized>(config: &HandshakeConfig, rng: &mut G) -> Result<Self> {
        let generator = match config.generator {
            Some(g) => g,
            None => sample(rng, "generator", config.generator_min, config.generator_max)?,
        };
        let modulus = match config.modulus {
            Some(n) => n,
            None => sample(rng, "modulus", config.modulus_min, config.modulus_max)?,
        };
        Self::new(generator, modulus)
    }

    /// Generator `a`
    pub fn generator(&self) -> i64 {
        self.generator
    }

    /// Modulus `n`
    pub fn modulus(&self) -> i64 {
        self.modulus
    }

    /// `PROP a n` frame for this proposal.
    pub fn to_frame(&self) -> Frame {
        Frame::Prop {
            generator: self.generator,
            modulus: self.modulus,
        }
    }
}

/// Locally generated secret exponent `x`. Never sent to the peer.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateExponent(i64);

impl PrivateExponent {
    /// Draw an exponent uniformly from the configured range.
    pub fn generate<G: Rng + ?Sized>(config: &HandshakeConfig, rng: &mut G) -> Result<Self> {
        let x = sample(rng, "exponent", config.exponent_min, config.exponent_max)?;
        Ok(Self(x))
    }

    /// Wrap a known exponent.
    pub fn from_value(x: i64) -> Result<Self> {
        if x < 0 {
            return Err(DhError::Arithmetic(format!(
                "private exponent must be non-negative, got {x}"
            )));
        }
        Ok(Self(x))
    }

    /// `base^x mod n`
    fn apply(&self, base: i64, modulus: i64) -> Result<i64> {
        modexp(base, self.0, modulus)
    }
}

impl fmt::Debug for PrivateExponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateExponent([REDACTED])")
    }
}

/// Both public values, available once the KEY exchange completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeResult {
    /// Our public value `a^x mod n`
    pub ours: i64,
    /// The peer's public value as received
    pub theirs: i64,
}

/// One side's key material for a handshake.
#[derive(Debug, Clone)]
pub struct KeyExchange {
    proposal: Proposal,
    secret: PrivateExponent,
    public: i64,
}

impl KeyExchange {
    /// Compute the public value for `secret` under `proposal`.
    pub fn new(proposal: Proposal, secret: PrivateExponent) -> Result<Self> {
        let public = secret.apply(proposal.generator, proposal.modulus)?;
        Ok(Self {
            proposal,
            secret,
            public,
        })
    }

    /// Generate a fresh secret and its public value.
    pub fn generate<G: Rng + ?Sized>(
        proposal: Proposal,
        config: &HandshakeConfig,
        rng: &mut G,
    ) -> Result<Self> {
        let secret = PrivateExponent::generate(config, rng)?;
        tracing::trace!("My X is: {}", secret.0);
        let keys = Self::new(proposal, secret)?;
        tracing::debug!("My exchange key Y is: {}", keys.public);
        Ok(keys)
    }

    /// Parameters this key material was computed under.
    pub fn proposal(&self) -> &Proposal {
        &self.proposal
    }

    /// Our public value, safe to send in the clear.
    pub fn public_value(&self) -> i64 {
        self.public
    }

    /// Derive the shared secret `theirs^x mod n`.
    ///
    /// The handshake itself ends at [`ExchangeResult`]; this is the step a
    /// caller takes afterwards to turn the exchange into a key.
    pub fn shared_secret(&self, result: &ExchangeResult) -> Result<i64> {
        self.secret.apply(result.theirs, self.proposal.modulus)
    }
}

fn sample<G: Rng + ?Sized>(rng: &mut G, name: &str, min: i64, max: i64) -> Result<i64> {
    if min > max {
        return Err(DhError::Config(format!(
            "{name} range is empty: {min}..={max}"
        )));
    }
    Ok(rng.gen_range(min..=max))
}
