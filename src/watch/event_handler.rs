// src/watch/event_handler.rs

//! Event processing logic for file system changes.

use std::path::Path;

use notify::EventKind;
use notify::event::ModifyKind;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::RuntimeEvent;
use crate::types::WatchEventKind;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::WatchProfile;

/// Map a notify event kind onto the add/change/unlink model.
///
/// Renames are reported per path; whether the path still exists decides
/// between "renamed in" (add) and "renamed away" (unlink). Access events are
/// ignored.
pub fn classify_event(kind: &EventKind, path: &Path) -> Option<WatchEventKind> {
    match kind {
        EventKind::Create(_) => Some(WatchEventKind::Add),
        EventKind::Remove(_) => Some(WatchEventKind::Unlink),
        EventKind::Modify(ModifyKind::Name(_)) => Some(if path.exists() {
            WatchEventKind::Add
        } else {
            WatchEventKind::Unlink
        }),
        EventKind::Modify(_) | EventKind::Any => Some(WatchEventKind::Change),
        EventKind::Access(_) | EventKind::Other => None,
    }
}

/// Process a single file change and fire every matching binding.
///
/// Returns `false` once the runtime channel is closed, so the caller can
/// stop its event loop.
pub async fn process_file_change(
    root: &Path,
    path: &Path,
    kind: WatchEventKind,
    profiles: &[WatchProfile],
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    let Some(rel) = relative_str(root, path) else {
        warn!("could not relativize path {:?} against root {:?}", path, root);
        return true;
    };

    for profile in profiles.iter().filter(|p| p.fires_on(&rel, kind)) {
        debug!(binding = profile.label(), path = %rel, ?kind, "watch match -> firing binding");
        let event = RuntimeEvent::BindingFired {
            binding: profile.id(),
            path: rel.clone(),
        };
        if let Err(err) = runtime_tx.send(event).await {
            warn!("failed to send RuntimeEvent::BindingFired: {err}");
            return false;
        }
    }

    true
}
