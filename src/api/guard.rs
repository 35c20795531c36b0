//! Availability guard for the local model server.
//!
//! Probes the configured URL before a chat request goes out. When the
//! server is down and auto-start is enabled, `ollama serve` is spawned
//! once and the probe retried for a bounded window; there is no retry
//! beyond that; the next send attempt starts over.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::api::{ollama::OllamaClient, ServerError};
use crate::config::ServerConfig;

const STARTUP_PROBES: u32 = 10;
const STARTUP_PROBE_INTERVAL: Duration = Duration::from_secs(1);

pub async fn ensure_available(config: &ServerConfig) -> Result<(), ServerError> {
    let client = OllamaClient::new(&config.url);
    if client.is_running().await {
        return Ok(());
    }

    if !config.auto_start {
        return Err(ServerError::ServerUnavailable(config.url.clone()));
    }

    log::info!("model server not reachable at {}, starting it", config.url);
    if let Err(err) = spawn_server() {
        log::warn!("failed to spawn the model server: {err}");
        return Err(ServerError::ServerUnavailable(config.url.clone()));
    }

    for _ in 0..STARTUP_PROBES {
        tokio::time::sleep(STARTUP_PROBE_INTERVAL).await;
        if client.is_running().await {
            log::info!("model server is up");
            return Ok(());
        }
    }

    Err(ServerError::ServerUnavailable(config.url.clone()))
}

fn spawn_server() -> std::io::Result<()> {
    Command::new("ollama")
        .arg("serve")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}
