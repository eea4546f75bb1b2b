// src/server/reload.rs

//! Live-reload signalling.

use tokio::sync::broadcast;
use tracing::debug;

/// Something that tells connected browsers to reload.
pub trait Reloader: Send + Sync {
    fn reload(&self);
}

/// Broadcast hub behind the server's event-stream endpoint.
///
/// Every connected page holds a subscription; [`Reloader::reload`] sends one
/// message to all of them. Sending with nobody connected is not an error.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<()>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn subscribers(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Reloader for ReloadHub {
    fn reload(&self) {
        let clients = self.tx.send(()).unwrap_or(0);
        debug!(clients, "reload signal sent");
    }
}
