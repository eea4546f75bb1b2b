// src/plan/mod.rs

//! Composition of task primitives.
//!
//! - [`Step`] is a tree of tasks run in series or in parallel.
//! - [`pipelines`] declares the `serve`, `lib` and `build` pipelines and
//!   their watch bindings.
//! - [`graph`] checks a composition against the artifacts each task reads,
//!   writes and clears.

use std::fmt::Write as _;

use crate::task::TaskId;

pub mod graph;
pub mod pipelines;

pub use graph::validate_step;
pub use pipelines::{BindingSpec, Pipeline, ServerStage};

/// A composition of tasks.
///
/// `Series` runs its children one after another; `Parallel` starts all of
/// them at once and completes when every child has completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Task(TaskId),
    Series(Vec<Step>),
    Parallel(Vec<Step>),
}

impl From<TaskId> for Step {
    fn from(id: TaskId) -> Self {
        Step::Task(id)
    }
}

pub fn series<S: Into<Step>>(steps: impl IntoIterator<Item = S>) -> Step {
    Step::Series(steps.into_iter().map(Into::into).collect())
}

pub fn parallel<S: Into<Step>>(steps: impl IntoIterator<Item = S>) -> Step {
    Step::Parallel(steps.into_iter().map(Into::into).collect())
}

impl Step {
    /// Every task in the tree, in declaration order.
    pub fn tasks(&self) -> Vec<TaskId> {
        let mut out = Vec::new();
        self.collect_tasks(&mut out);
        out
    }

    fn collect_tasks(&self, out: &mut Vec<TaskId>) {
        match self {
            Step::Task(id) => out.push(*id),
            Step::Series(children) | Step::Parallel(children) => {
                for child in children {
                    child.collect_tasks(out);
                }
            }
        }
    }

    /// Indented, one-node-per-line rendering used by `--dry-run`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match self {
            Step::Task(id) => {
                let _ = writeln!(out, "{pad}{id}");
            }
            Step::Series(children) | Step::Parallel(children) => {
                let kind = if matches!(self, Step::Series(_)) { "series" } else { "parallel" };
                let _ = writeln!(out, "{pad}{kind}");
                for child in children {
                    child.render_into(out, depth + 1);
                }
            }
        }
    }
}
