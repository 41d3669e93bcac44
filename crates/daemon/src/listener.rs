//! Listener setup: first free port in the configured range

use anyhow::{bail, Result};
use std::ops::RangeInclusive;
use tokio::net::TcpListener;
use tracing::debug;

/// Bind `host` on the first port in `ports` that accepts the bind.
///
/// Label SDKs probe the same fixed range, so a second instance (or another
/// program) holding the first port just pushes us to the next one.
pub async fn bind_first_free_port(host: &str, ports: RangeInclusive<u16>) -> Result<TcpListener> {
    let (first, last) = (*ports.start(), *ports.end());

    for port in ports {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) => debug!(host = %host, port = port, error = %e, "Port unavailable"),
        }
    }

    bail!("no free port on {} in range {}-{}", host, first, last)
}
