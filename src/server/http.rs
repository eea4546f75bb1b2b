// src/server/http.rs

//! Static file server with live reload.
//!
//! Files are served from one output tree. HTML responses get a small client
//! script appended that listens on [`RELOAD_PATH`] (server-sent events) and
//! reloads the page when the [`ReloadHub`] fires.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, error, info, warn};

use crate::errors::Result;
use crate::server::reload::ReloadHub;

/// Event-stream endpoint the injected client listens on.
pub const RELOAD_PATH: &str = "/__frontpipe/reload";

const RELOAD_CLIENT: &str = concat!(
    "<script>(function(){",
    "var es=new EventSource(\"/__frontpipe/reload\");",
    "es.addEventListener(\"reload\",function(){window.location.reload();});",
    "})();</script>"
);

/// Where and what to serve.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
    pub root: PathBuf,
    pub live_reload: bool,
}

#[derive(Clone)]
struct AppState {
    root: Arc<PathBuf>,
    hub: ReloadHub,
    live_reload: bool,
}

/// A running server. Dropping the handle stops it.
#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Build the router without binding a socket.
pub fn router(root: impl Into<PathBuf>, hub: ReloadHub, live_reload: bool) -> Router {
    let state = AppState {
        root: Arc::new(root.into()),
        hub,
        live_reload,
    };
    Router::new()
        .route(RELOAD_PATH, get(reload_events))
        .fallback(static_files)
        .with_state(state)
}

/// Bind and start serving in the background.
///
/// Port `0` picks a free port; the bound address is on the handle.
pub async fn start_server(options: ServerOptions, hub: ReloadHub) -> Result<ServerHandle> {
    let listener = TcpListener::bind((options.host.as_str(), options.port)).await?;
    let addr = listener.local_addr()?;
    let app = router(options.root.clone(), hub, options.live_reload);

    let task = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!(error = %err, "server stopped");
        }
    });

    info!(root = ?options.root, "serving at http://{addr}");
    Ok(ServerHandle { addr, task })
}

async fn reload_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    debug!("reload client connected");
    // A lagged receiver still only needs one reload.
    let stream = BroadcastStream::new(state.hub.subscribe())
        .map(|_| Ok(Event::default().event("reload").data("reload")));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn static_files(State(state): State<AppState>, req: Request) -> Response {
    let response = match ServeDir::new(state.root.as_path()).oneshot(req).await {
        Ok(res) => res.map(Body::new),
        Err(never) => match never {},
    };

    if state.live_reload && is_html(&response) {
        with_reload_client(response).await
    } else {
        response
    }
}

fn is_html(response: &Response) -> bool {
    response.status() == StatusCode::OK
        && response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/html"))
}

async fn with_reload_client(response: Response) -> Response {
    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "failed to buffer html response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let page = inject_reload_client(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(page))
}

/// Insert the reload client before the last `</body>`, or append it when the
/// page has none.
pub fn inject_reload_client(html: &str) -> String {
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + RELOAD_CLIENT.len());
            out.push_str(&html[..idx]);
            out.push_str(RELOAD_CLIENT);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{html}{RELOAD_CLIENT}"),
    }
}
