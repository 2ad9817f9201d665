//! dh-peer CLI binary.
//!
//! Two-party Diffie-Hellman handshake over a direct TCP connection.
//!
//! # Commands
//!
//! - `passive` - Wait for an initiator and answer its proposal
//! - `active <address>` - Dial a responder and propose parameters

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dh_peer::{Config, Outcome, Peer, VERSION};

#[derive(Parser)]
#[command(name = "dh-peer")]
#[command(version = VERSION)]
#[command(about = "Two-party Diffie-Hellman key exchange peer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Port to listen on or dial (default: 1234)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// How long a passive peer waits for a connection, in milliseconds (default: 200000)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// TOML configuration file (default: DH_PEER_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind and wait for an initiator
    Passive,

    /// Dial a waiting responder
    Active {
        /// Remote address of the responder
        address: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = load_config(&cli)?;
    let mut peer = Peer::new(config);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async {
        match &cli.command {
            Commands::Passive => peer.run_passive().await,
            Commands::Active { address } => peer.run_active(address).await,
        }
    });

    report(result)
}

/// Print the outcome; only fatal errors reach the exit status.
fn report(result: dh_peer::Result<Outcome>) -> anyhow::Result<()> {
    match result {
        Ok(Outcome::Exchanged(done)) => {
            println!("Our public value:   {}", done.result.ours);
            println!("Their public value: {}", done.result.theirs);
        },
        Ok(Outcome::NotAcknowledged { reply }) => {
            println!("The proposal was not acknowledged: {reply}");
        },
        Ok(Outcome::TimedOut) => {
            println!("A timeout occurred. No connection possible.");
        },
        Err(e) if !e.is_fatal() => {
            tracing::warn!("{}", e);
            println!("A timeout occurred. No connection possible.");
        },
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::from_env(),
    };

    if let Some(port) = cli.port {
        config.peer.port = port;
    }
    if let Some(ms) = cli.timeout_ms {
        config.peer.accept_timeout_ms = ms;
    }

    config.validate()?;
    Ok(config)
}
