//! Subscriber setup for hosts and demos.
//!
//! The library only emits `tracing` events; nothing here runs unless a host
//! calls [`init_tracing`].

use crate::error::{LifetimeError, Result};
use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| LifetimeError::Configuration(format!("invalid log filter: {}", e)))?;

    fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| LifetimeError::Configuration(format!("tracing already initialised: {}", e)))
}
