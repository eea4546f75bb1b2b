// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The watch runtime talks to an `ExecutorBackend` instead of running steps
//! directly. This makes it easy to swap in a fake executor in tests while
//! keeping the production implementation in [`PlanExecutor`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::Result;
use crate::plan::Step;
use crate::task::TaskContext;

use super::runner::{FailurePolicy, RunSummary, run_step};

/// Trait abstracting how a step is executed.
///
/// Production code uses [`PlanExecutor`]; tests can provide their own
/// implementation that records steps instead of touching the filesystem.
pub trait ExecutorBackend: Send + Sync {
    /// Run `step` to completion.
    fn execute(&self, step: Step) -> Pin<Box<dyn Future<Output = Result<RunSummary>> + Send + '_>>;
}

/// Real executor: runs task primitives against a shared [`TaskContext`].
pub struct PlanExecutor {
    ctx: Arc<TaskContext>,
    policy: FailurePolicy,
}

impl PlanExecutor {
    pub fn new(ctx: Arc<TaskContext>, policy: FailurePolicy) -> Self {
        Self { ctx, policy }
    }

    pub fn context(&self) -> &Arc<TaskContext> {
        &self.ctx
    }
}

impl ExecutorBackend for PlanExecutor {
    fn execute(&self, step: Step) -> Pin<Box<dyn Future<Output = Result<RunSummary>> + Send + '_>> {
        run_step(step, Arc::clone(&self.ctx), self.policy)
    }
}
