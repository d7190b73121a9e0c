//! CLI subcommands.

pub mod classify;
pub mod count;
pub mod waitlist;

use std::io::Write;

use restock_core::IdError;
use restock_waitlist::{ConfigError, WaitlistClient, WaitlistConfig};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded from the environment.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A variant or product ID is neither numeric nor a Shopify global ID.
    #[error(transparent)]
    InvalidId(#[from] IdError),

    /// The waitlist service or local validation rejected the request.
    #[error("{0}")]
    Rejected(String),

    /// Result could not be written to stdout.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Result could not be serialized.
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Build a client from `RESTOCK_*` environment variables.
fn client_from_env() -> Result<WaitlistClient, CommandError> {
    let config = WaitlistConfig::from_env()?;
    tracing::debug!(?config, "Loaded waitlist configuration");
    Ok(WaitlistClient::new(config))
}

/// Pretty-print `value` as JSON on stdout.
fn write_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
