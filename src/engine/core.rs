// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state (the number of runs in flight)
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - spawning runs on the executor
//! - sending reload signals
//!
//! The core is intended to be unit tested without any Tokio, channels,
//! filesystem, or processes.

use crate::engine::event_handlers::{CoreStep, handle_binding_fired, handle_run_finished};
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::plan::{BindingSpec, Step};

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    /// Label and step per binding, indexed by `BindingId`.
    bindings: Vec<(String, Step)>,
    in_flight: usize,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(bindings: &[BindingSpec], options: RuntimeOptions) -> Self {
        Self {
            bindings: bindings
                .iter()
                .map(|b| (b.label.clone(), b.step.clone()))
                .collect(),
            in_flight: 0,
            options,
        }
    }

    /// Number of runs started and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::BindingFired { binding, path } => {
                handle_binding_fired(&self.bindings, &mut self.in_flight, binding, &path)
            }
            RuntimeEvent::RunFinished { success, .. } => {
                handle_run_finished(&mut self.in_flight, &self.options, success)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
