//! Public tunnel for development-time reachability
//!
//! Runs the ngrok agent as a child process pointed at the local port and asks
//! its local API for the public URL. The child is killed when the [`Tunnel`]
//! is dropped.

use crate::models::TunnelConfig;
use crate::{Error, Result};
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const STARTUP_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Deserialize)]
struct TunnelList {
    tunnels: Vec<TunnelInfo>,
}

#[derive(Debug, Deserialize)]
struct TunnelInfo {
    public_url: String,
    #[serde(default)]
    proto: String,
    #[serde(default)]
    config: Option<TunnelTarget>,
}

#[derive(Debug, Deserialize)]
struct TunnelTarget {
    addr: String,
}

impl TunnelInfo {
    /// The agent reports the upstream as `http://localhost:5001`,
    /// `localhost:5001` or a bare `5001`.
    fn forwards_to(&self, port: u16) -> bool {
        let port = port.to_string();
        self.config.as_ref().is_some_and(|target| {
            let addr = target.addr.trim_end_matches('/');
            addr == port || addr.ends_with(&format!(":{}", port))
        })
    }
}

pub struct Tunnel {
    child: Child,
    public_url: String,
}

impl Tunnel {
    /// Start the agent for `port` and wait for it to report a public URL.
    pub async fn open(config: &TunnelConfig, port: u16) -> Result<Self> {
        let mut child = Command::new(&config.binary)
            .arg("http")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Tunnel(format!("Failed to start {}: {}", config.binary, e)))?;

        tracing::debug!("Started {} (pid {:?})", config.binary, child.id());

        // `child` is killed on drop if the agent never reports a URL.
        let client = reqwest::Client::new();
        let public_url = wait_for_public_url(
            &client,
            &config.api_url,
            port,
            STARTUP_TIMEOUT,
            || ensure_running(&mut child),
        )
        .await?;

        Ok(Self { child, public_url })
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    /// Stop the agent and wait for it to exit.
    pub async fn close(mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!("Failed to stop tunnel process: {}", e);
        } else {
            tracing::info!("Public tunnel closed");
        }
    }
}

/// A stale agent from an earlier run can still answer on the API port after
/// ours has died, so a dead child ends the wait.
fn ensure_running(child: &mut Child) -> Result<()> {
    match child.try_wait() {
        Ok(None) => Ok(()),
        Ok(Some(status)) => Err(Error::Tunnel(format!(
            "Tunnel agent exited ({}) before reporting a public URL",
            status
        ))),
        Err(e) => Err(Error::Tunnel(format!(
            "Failed to check tunnel agent status: {}",
            e
        ))),
    }
}

async fn fetch_public_url(
    client: &reqwest::Client,
    api_url: &str,
    port: u16,
) -> Result<Option<String>> {
    let list: TunnelList = client
        .get(format!("{}/api/tunnels", api_url))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(pick_public_url(list.tunnels, port))
}

/// Only tunnels forwarding to `port` count; prefer the https endpoint when
/// the agent reports several.
fn pick_public_url(tunnels: Vec<TunnelInfo>, port: u16) -> Option<String> {
    let mut fallback = None;
    for tunnel in tunnels.into_iter().filter(|t| t.forwards_to(port)) {
        if tunnel.proto == "https" || tunnel.public_url.starts_with("https://") {
            return Some(tunnel.public_url);
        }
        fallback.get_or_insert(tunnel.public_url);
    }
    fallback
}

async fn wait_for_public_url<F>(
    client: &reqwest::Client,
    api_url: &str,
    port: u16,
    timeout: Duration,
    mut ensure_alive: F,
) -> Result<String>
where
    F: FnMut() -> Result<()>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        ensure_alive()?;
        match fetch_public_url(client, api_url, port).await {
            Ok(Some(url)) => return Ok(url),
            Ok(None) => tracing::debug!("Tunnel agent is up but has no tunnels yet"),
            Err(e) => tracing::debug!("Tunnel agent not ready: {}", e),
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(Error::Tunnel(format!(
                "No public URL reported by {} within {:?}",
                api_url, timeout
            )));
        }
        tokio::time::sleep(STARTUP_POLL).await;
    }
}
