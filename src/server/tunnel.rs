// src/server/tunnel.rs

//! Public tunnel to the local server.
//!
//! The tunnel is an external long-lived command (`[tunnel].cmd`). Its stdout
//! is watched for the public URL; after that the process keeps running and
//! its output is only logged.

use std::process::Stdio;
use std::time::Duration;

use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::TunnelSection;
use crate::errors::{PipelineError, Result};
use crate::exec::tool::{render_template, shell_command};

/// A running tunnel process and the URL it announced.
///
/// Dropping this kills the process.
#[derive(Debug)]
pub struct Tunnel {
    url: String,
    _child: Child,
}

impl Tunnel {
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Start the tunnel command for `port` and wait for its public URL.
///
/// Fails if the command exits, or prints nothing matching
/// `[tunnel].url_pattern` within `startup_timeout`.
pub async fn open_tunnel(
    section: &TunnelSection,
    startup_timeout: Duration,
    port: u16,
) -> Result<Tunnel> {
    let pattern = Regex::new(&section.url_pattern)
        .map_err(|e| PipelineError::Tunnel(format!("invalid url_pattern: {e}")))?;
    let cmdline = render_template(&section.cmd, None, None, Some(port));
    info!(cmd = %cmdline, "starting tunnel");

    let mut child = shell_command(&cmdline)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| PipelineError::Tunnel("tunnel stdout not captured".to_string()))?;
    if let Some(stderr) = child.stderr.take() {
        drain_lines("tunnel stderr", stderr);
    }

    let url_rx = spawn_url_monitor(stdout, pattern);

    match timeout(startup_timeout, url_rx).await {
        Ok(Ok(url)) => {
            info!(%url, "tunnel established");
            Ok(Tunnel { url, _child: child })
        }
        Ok(Err(_)) => Err(PipelineError::Tunnel(
            "tunnel exited before printing a public URL".to_string(),
        )),
        Err(_) => Err(PipelineError::Tunnel(format!(
            "no public URL within {startup_timeout:?}"
        ))),
    }
}

/// Read stdout line by line; the first capture of `pattern` is sent once,
/// the rest of the stream is consumed so the pipe never fills.
fn spawn_url_monitor<R>(stdout: R, pattern: Regex) -> oneshot::Receiver<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let mut tx = Some(tx);
        let mut lines = BufReader::new(stdout).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            debug!("tunnel stdout: {}", line);

            if tx.is_none() {
                continue;
            }
            if let Some(url) = pattern
                .captures(&line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
            {
                if let Some(tx) = tx.take() {
                    let _ = tx.send(url);
                }
            }
        }
        debug!("tunnel stdout closed");
    });

    rx
}

fn drain_lines<R>(label: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!("{label}: {}", line);
        }
    });
}
