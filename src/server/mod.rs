// src/server/mod.rs

//! Long-running stages started after a pipeline's plan: the static server,
//! its live-reload hub, and the optional public tunnel.

pub mod http;
pub mod reload;
pub mod tunnel;

pub use http::{RELOAD_PATH, ServerHandle, ServerOptions, inject_reload_client, start_server};
pub use reload::{ReloadHub, Reloader};
pub use tunnel::{Tunnel, open_tunnel};
