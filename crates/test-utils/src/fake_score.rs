use std::sync::Mutex;

use frontpipe::errors::PipelineError;
use frontpipe::report::{ScoreClient, ScoreFuture, Scores};
use frontpipe::types::Strategy;

/// Score client that records every request and answers with fixed scores.
///
/// Requests for a URL containing `fail_on` return a report error.
#[derive(Debug)]
pub struct FakeScoreClient {
    scores: Scores,
    fail_on: Option<String>,
    calls: Mutex<Vec<(String, Strategy)>>,
}

impl FakeScoreClient {
    pub fn new(performance: f64, accessibility: f64) -> Self {
        Self {
            scores: Scores {
                performance: Some(performance),
                accessibility: Some(accessibility),
            },
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, Strategy)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ScoreClient for FakeScoreClient {
    fn score<'a>(&'a self, url: &'a str, strategy: Strategy) -> ScoreFuture<'a> {
        Box::pin(async move {
            self.calls.lock().unwrap().push((url.to_string(), strategy));
            if self.fail_on.as_deref().is_some_and(|n| url.contains(n)) {
                return Err(PipelineError::Report(format!("{url}: fake failure")));
            }
            Ok(self.scores)
        })
    }
}
