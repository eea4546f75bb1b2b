// src/engine/mod.rs

//! Watch/reload engine.
//!
//! A watch binding fires on a filesystem event; the engine runs the bound
//! step and, once that run succeeds, signals connected browsers to reload.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

/// Index of a watch binding in the pipeline's binding list.
pub type BindingId = usize;

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit once no run is in flight (used by tests to drive a
    /// fixed number of triggers to completion).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from watchers and finished runs.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A filesystem event matched a binding.
    BindingFired { binding: BindingId, path: String },
    /// A run started for a binding has completed.
    RunFinished { binding: BindingId, success: bool },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
