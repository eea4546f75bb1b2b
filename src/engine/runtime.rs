// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::plan::Step;
use crate::server::reload::Reloader;

use super::core::CoreRuntime;
use super::{BindingId, CoreCommand, RuntimeEvent};

/// Drives watch-triggered runs in response to `RuntimeEvent`s, delegating
/// execution to an `ExecutorBackend` and reloads to a `Reloader`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics. Each run is spawned as its own Tokio task and reports
/// back through the event channel.
pub struct Runtime<E: ExecutorBackend + 'static, R: Reloader + 'static> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    event_tx: mpsc::Sender<RuntimeEvent>,
    executor: Arc<E>,
    reloader: Arc<R>,
}

impl<E: ExecutorBackend + 'static, R: Reloader + 'static> fmt::Debug for Runtime<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend + 'static, R: Reloader + 'static> Runtime<E, R> {
    /// `event_tx` must feed `event_rx`; finished runs are reported through it.
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        event_tx: mpsc::Sender<RuntimeEvent>,
        executor: Arc<E>,
        reloader: Arc<R>,
    ) -> Self {
        Self {
            core,
            event_rx,
            event_tx,
            executor,
            reloader,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core (start runs, reload, exit).
    pub async fn run(mut self) -> Result<()> {
        info!("watch runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    fn execute_command(&self, command: CoreCommand) {
        match command {
            CoreCommand::Execute {
                binding,
                label,
                step,
            } => self.spawn_run(binding, label, step),
            CoreCommand::Reload => self.reloader.reload(),
            CoreCommand::RequestExit => {
                info!("core issued RequestExit command");
            }
        }
    }

    fn spawn_run(&self, binding: BindingId, label: String, step: Step) {
        let executor = Arc::clone(&self.executor);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            info!(binding = %label, "re-running bound tasks");
            let success = match executor.execute(step).await {
                Ok(summary) => {
                    for failed in summary.failures() {
                        warn!(binding = %label, task = %failed.task, "task failed during re-run");
                    }
                    summary.succeeded()
                }
                Err(err) => {
                    error!(binding = %label, error = %err, "re-run failed");
                    false
                }
            };

            if tx
                .send(RuntimeEvent::RunFinished { binding, success })
                .await
                .is_err()
            {
                debug!(binding = %label, "runtime gone before run finished");
            }
        });
    }
}
