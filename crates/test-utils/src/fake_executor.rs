use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use frontpipe::errors::Result;
use frontpipe::exec::{ExecutorBackend, RunSummary, TaskOutcome, TaskRecord};
use frontpipe::plan::Step;
use frontpipe::server::Reloader;

/// A fake executor that:
/// - records which steps were "run"
/// - reports every task of the step as succeeded, or all as failed when
///   built with [`FakeExecutor::failing`].
#[derive(Default)]
pub struct FakeExecutor {
    executed: Arc<Mutex<Vec<Step>>>,
    fail: AtomicBool,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let exec = Self::default();
        exec.fail.store(true, Ordering::SeqCst);
        exec
    }

    pub fn executed(&self) -> Vec<Step> {
        self.executed.lock().unwrap().clone()
    }
}

impl ExecutorBackend for FakeExecutor {
    fn execute(&self, step: Step) -> Pin<Box<dyn Future<Output = Result<RunSummary>> + Send + '_>> {
        Box::pin(async move {
            let outcome = if self.fail.load(Ordering::SeqCst) {
                TaskOutcome::Failed("fake failure".to_string())
            } else {
                TaskOutcome::Success
            };

            let records = step
                .tasks()
                .into_iter()
                .map(|task| TaskRecord {
                    task,
                    outcome: outcome.clone(),
                    elapsed: Duration::ZERO,
                })
                .collect();

            self.executed.lock().unwrap().push(step);
            Ok(RunSummary { records })
        })
    }
}

/// Reloader that only counts how often it was asked to reload.
#[derive(Debug, Default)]
pub struct CountingReloader {
    count: AtomicUsize,
}

impl CountingReloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Reloader for CountingReloader {
    fn reload(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
