// src/exec/runner.rs

//! Step runner: series steps await one another, parallel steps run as
//! separate Tokio tasks and are joined.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::errors::{PipelineError, Result};
use crate::plan::Step;
use crate::task::{TaskContext, TaskId, run_task};

/// What happens to the rest of a step when a task fails.
///
/// - `Isolate`: log the failure and keep going (interactive pipelines and
///   watch re-runs).
/// - `Abort`: stop at the first failure and return it (production build).
///   Parallel siblings that already started are still awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Isolate,
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub task: TaskId,
    pub outcome: TaskOutcome,
    pub elapsed: Duration,
}

/// Outcomes of every task a step ran, in completion order within parallel
/// branches and declaration order otherwise.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub records: Vec<TaskRecord>,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.records
            .iter()
            .all(|r| r.outcome == TaskOutcome::Success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskRecord> {
        self.records
            .iter()
            .filter(|r| r.outcome != TaskOutcome::Success)
    }

    /// Task ids in the order they were recorded.
    pub fn tasks(&self) -> Vec<TaskId> {
        self.records.iter().map(|r| r.task).collect()
    }

    fn merge(&mut self, other: RunSummary) {
        self.records.extend(other.records);
    }
}

pub type StepFuture = Pin<Box<dyn Future<Output = Result<RunSummary>> + Send>>;

/// Run a step tree against a task context.
pub fn run_step(step: Step, ctx: Arc<TaskContext>, policy: FailurePolicy) -> StepFuture {
    Box::pin(async move {
        match step {
            Step::Task(id) => run_one(id, ctx, policy).await,
            Step::Series(children) => {
                let mut summary = RunSummary::default();
                for child in children {
                    summary.merge(run_step(child, Arc::clone(&ctx), policy).await?);
                }
                Ok(summary)
            }
            Step::Parallel(children) => {
                let handles: Vec<JoinHandle<Result<RunSummary>>> = children
                    .into_iter()
                    .map(|child| tokio::spawn(run_step(child, Arc::clone(&ctx), policy)))
                    .collect();

                let mut summary = RunSummary::default();
                let mut first_err = None;
                for handle in handles {
                    match handle.await {
                        Ok(Ok(branch)) => summary.merge(branch),
                        Ok(Err(err)) => {
                            first_err.get_or_insert(err);
                        }
                        Err(join_err) => {
                            first_err.get_or_insert(PipelineError::Other(anyhow!(
                                "parallel branch panicked: {join_err}"
                            )));
                        }
                    }
                }

                match first_err {
                    Some(err) => Err(err),
                    None => Ok(summary),
                }
            }
        }
    })
}

async fn run_one(id: TaskId, ctx: Arc<TaskContext>, policy: FailurePolicy) -> Result<RunSummary> {
    info!(task = %id, "starting task");
    let started = Instant::now();
    let result = run_task(id, ctx).await;
    let elapsed = started.elapsed();
    let elapsed_ms = elapsed.as_millis() as u64;

    let outcome = match result {
        Ok(report) => {
            info!(
                task = %id,
                elapsed_ms,
                files = report.files_written,
                note = report.note.as_deref().unwrap_or(""),
                "task finished"
            );
            TaskOutcome::Success
        }
        Err(err) => {
            let message = format!("{err:#}");
            error!(task = %id, elapsed_ms, error = %message, "task failed");
            if policy == FailurePolicy::Abort {
                return Err(PipelineError::TaskFailed {
                    task: id.name(),
                    message,
                });
            }
            TaskOutcome::Failed(message)
        }
    };

    Ok(RunSummary {
        records: vec![TaskRecord {
            task: id,
            outcome,
            elapsed,
        }],
    })
}
