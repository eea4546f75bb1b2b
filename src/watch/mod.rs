// src/watch/mod.rs

//! File watching and glob selection.
//!
//! This module is responsible for:
//! - Compiling include/exclude glob patterns, both for task input selection
//!   and for watch bindings.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//!
//! It does **not** run anything; it only turns filesystem changes into
//! binding-level triggers for the engine.

pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use patterns::{PatternSet, WatchProfile, build_watch_profiles, collect_matching_files};
pub use watcher::{WatcherHandle, spawn_watcher};
