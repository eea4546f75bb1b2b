// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::watch::event_handler::{classify_event, process_file_change};
use crate::watch::patterns::WatchProfile;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher on `watch_dir` (recursively) that sends
/// `RuntimeEvent::BindingFired` for every binding whose patterns match a
/// changed path.
///
/// - `project_root` is the directory all binding globs are relative to.
/// - `watch_dir` is the directory actually observed (the source tree).
/// - `profiles` are the compiled bindings.
/// - `runtime_tx` is the channel into the watch runtime.
pub fn spawn_watcher(
    project_root: impl Into<PathBuf>,
    watch_dir: impl Into<PathBuf>,
    profiles: Vec<WatchProfile>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = project_root.into();
    // Canonicalize once so event paths and the root share a prefix.
    let root = root.canonicalize().unwrap_or(root);
    let watch_dir = watch_dir.into();
    let watch_dir = watch_dir.canonicalize().unwrap_or(watch_dir);

    let profiles = Arc::new(profiles);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("frontpipe: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("frontpipe: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&watch_dir, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", watch_dir);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");

            for path in &event.paths {
                let Some(kind) = classify_event(&event.kind, path) else {
                    continue;
                };
                if !process_file_change(&root, path, kind, &profiles, &runtime_tx).await {
                    warn!("runtime channel closed; stopping watcher loop");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
