// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, warn};

use crate::engine::{BindingId, RuntimeOptions};
use crate::plan::Step;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start a run of `step` for `binding`. Runs are independent; a new
    /// trigger never waits for or cancels an earlier run.
    Execute {
        binding: BindingId,
        label: String,
        step: Step,
    },
    /// Tell connected browsers to reload.
    Reload,
    /// Request that the runtime exits.
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn idle() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }
}

/// A binding fired: start its step.
pub fn handle_binding_fired(
    bindings: &[(String, Step)],
    in_flight: &mut usize,
    binding: BindingId,
    path: &str,
) -> CoreStep {
    let Some((label, step)) = bindings.get(binding) else {
        warn!(binding, path, "event for unknown binding ignored");
        return CoreStep::idle();
    };

    debug!(binding = %label, path, "binding fired");
    *in_flight += 1;

    CoreStep {
        commands: vec![CoreCommand::Execute {
            binding,
            label: label.clone(),
            step: step.clone(),
        }],
        keep_running: true,
    }
}

/// A run finished: reload on success, and exit if idle and asked to.
pub fn handle_run_finished(
    in_flight: &mut usize,
    options: &RuntimeOptions,
    success: bool,
) -> CoreStep {
    *in_flight = in_flight.saturating_sub(1);

    let mut commands = Vec::new();
    if success {
        commands.push(CoreCommand::Reload);
    }

    let mut keep_running = true;
    if options.exit_when_idle && *in_flight == 0 {
        commands.push(CoreCommand::RequestExit);
        keep_running = false;
    }

    CoreStep {
        commands,
        keep_running,
    }
}
