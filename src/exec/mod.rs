// src/exec/mod.rs

//! Execution layer.
//!
//! - [`runner`] walks a step tree and runs task primitives.
//! - [`backend`] defines the executor abstraction used by the watch runtime.
//! - [`tool`] runs external command-line tools.

pub mod backend;
pub mod runner;
pub mod tool;

pub use backend::{ExecutorBackend, PlanExecutor};
pub use runner::{FailurePolicy, RunSummary, TaskOutcome, TaskRecord, run_step};
