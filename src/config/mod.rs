//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (applied by the binary on top of either)

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DhError, Result};

/// Default TCP port for both roles
pub const DEFAULT_PORT: u16 = 1234;

/// Default accept window for the responder (milliseconds)
pub const DEFAULT_ACCEPT_TIMEOUT_MS: u64 = 200_000;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Connection settings
    #[serde(default)]
    pub peer: PeerConfig,

    /// Parameter and secret generation
    #[serde(default)]
    pub handshake: HandshakeConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            DhError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `DH_PEER_*` overrides looked up through `lookup`.
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(port) = lookup("DH_PEER_PORT") {
            match port.parse() {
                Ok(port) => self.peer.port = port,
                Err(_) => tracing::warn!("Ignoring invalid DH_PEER_PORT={}", port),
            }
        }
        if let Some(host) = lookup("DH_PEER_BIND_HOST") {
            self.peer.bind_host = host;
        }
        if let Some(timeout) = lookup("DH_PEER_ACCEPT_TIMEOUT_MS") {
            match timeout.parse() {
                Ok(ms) => self.peer.accept_timeout_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid DH_PEER_ACCEPT_TIMEOUT_MS={}", timeout),
            }
        }
        self
    }

    /// Check that every range is usable.
    pub fn validate(&self) -> Result<()> {
        if self.peer.accept_timeout_ms == 0 {
            return Err(DhError::Config("accept_timeout_ms must be positive".to_string()));
        }
        self.handshake.validate()
    }
}

/// Connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    /// Port to listen on (responder) or dial (initiator)
    pub port: u16,

    /// Host the responder binds to
    pub bind_host: String,

    /// How long the responder waits for the initiator
    pub accept_timeout_ms: u64,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_host: "0.0.0.0".to_string(),
            accept_timeout_ms: DEFAULT_ACCEPT_TIMEOUT_MS,
        }
    }
}

impl PeerConfig {
    /// Get the full listen address
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    /// Accept window as a [`Duration`]
    pub fn accept_timeout(&self) -> Duration {
        Duration::from_millis(self.accept_timeout_ms)
    }
}

/// Handshake parameter configuration
///
/// All ranges are inclusive. A fixed `generator` or `modulus` replaces the
/// sampled value on the initiator side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeConfig {
    /// Smallest private exponent
    pub exponent_min: i64,
    /// Largest private exponent
    pub exponent_max: i64,
    /// Smallest sampled generator
    pub generator_min: i64,
    /// Largest sampled generator
    pub generator_max: i64,
    /// Smallest sampled modulus
    pub modulus_min: i64,
    /// Largest sampled modulus
    pub modulus_max: i64,
    /// Fixed generator to propose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<i64>,
    /// Fixed modulus to propose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modulus: Option<i64>,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            exponent_min: 50,
            exponent_max: 99,
            generator_min: 2,
            generator_max: 100,
            modulus_min: 10_000,
            modulus_max: 200_000,
            generator: None,
            modulus: None,
        }
    }
}

impl HandshakeConfig {
    /// Propose fixed parameters instead of sampling them.
    pub fn with_fixed_proposal(mut self, generator: i64, modulus: i64) -> Self {
        self.generator = Some(generator);
        self.modulus = Some(modulus);
        self
    }

    /// Check that every range is non-empty and positive where required.
    pub fn validate(&self) -> Result<()> {
        check_range("exponent", self.exponent_min, self.exponent_max, 0)?;
        check_range("generator", self.generator_min, self.generator_max, 1)?;
        check_range("modulus", self.modulus_min, self.modulus_max, 1)?;

        for (name, value) in [("generator", self.generator), ("modulus", self.modulus)] {
            if let Some(v) = value {
                if v <= 0 {
                    return Err(DhError::Config(format!(
                        "fixed {name} must be positive, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_range(name: &str, min: i64, max: i64, floor: i64) -> Result<()> {
    if min < floor {
        return Err(DhError::Config(format!(
            "{name}_min must be at least {floor}, got {min}"
        )));
    }
    if min > max {
        return Err(DhError::Config(format!(
            "{name} range is empty: {min}..={max}"
        )));
    }
    Ok(())
}
