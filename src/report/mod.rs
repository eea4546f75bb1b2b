// src/report/mod.rs

//! PageSpeed report for the production tree.
//!
//! Every built page is scored once per strategy, all pages of one strategy
//! before the next, with a fixed pause after each page.

use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ReportSection;
use crate::errors::{PipelineError, Result};
use crate::fs::FileSystem;
use crate::types::Strategy;

/// Public base URL plus the page file names to score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    pub base_url: String,
    pub pages: Vec<String>,
}

impl ReportContext {
    /// Collect the top-level `*.html` files of `build_dir`, sorted by name.
    pub fn from_build_dir(
        base_url: impl Into<String>,
        fs: &dyn FileSystem,
        build_dir: &Path,
    ) -> Result<Self> {
        let mut pages = Vec::new();
        if fs.is_dir(build_dir) {
            for path in fs.read_dir(build_dir)? {
                let is_html = path.extension().is_some_and(|ext| ext == "html");
                if !is_html || !fs.is_file(&path) {
                    continue;
                }
                if let Some(name) = path.file_name() {
                    pages.push(name.to_string_lossy().into_owned());
                }
            }
        }
        pages.sort();

        Ok(Self {
            base_url: base_url.into(),
            pages,
        })
    }

    pub fn page_url(&self, page: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), page)
    }
}

/// Category scores in the 0..=1 range, as the API reports them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scores {
    pub performance: Option<f64>,
    pub accessibility: Option<f64>,
}

pub type ScoreFuture<'a> = Pin<Box<dyn Future<Output = Result<Scores>> + Send + 'a>>;

/// Source of page scores.
pub trait ScoreClient: Send + Sync {
    fn score<'a>(&'a self, url: &'a str, strategy: Strategy) -> ScoreFuture<'a>;
}

/// PageSpeed Insights v5 client.
#[derive(Debug, Clone)]
pub struct PsiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl PsiClient {
    pub fn new(section: &ReportSection) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: section.endpoint.clone(),
            api_key: section.api_key.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PsiResponse {
    lighthouse_result: LighthouseResult,
}

#[derive(Debug, Deserialize)]
struct LighthouseResult {
    categories: Categories,
}

#[derive(Debug, Deserialize)]
struct Categories {
    performance: Option<Category>,
    accessibility: Option<Category>,
}

#[derive(Debug, Deserialize)]
struct Category {
    score: Option<f64>,
}

impl ScoreClient for PsiClient {
    fn score<'a>(&'a self, url: &'a str, strategy: Strategy) -> ScoreFuture<'a> {
        Box::pin(async move {
            let mut query: Vec<(&str, &str)> = vec![
                ("url", url),
                ("strategy", strategy.as_str()),
                ("category", "performance"),
            ];
            if strategy == Strategy::Mobile {
                query.push(("category", "accessibility"));
            }
            if let Some(key) = &self.api_key {
                query.push(("key", key.as_str()));
            }

            debug!(%url, %strategy, "requesting PageSpeed score");
            let response = self
                .http
                .get(&self.endpoint)
                .query(&query)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| PipelineError::Report(format!("{url} ({strategy}): {e}")))?;

            let body: PsiResponse = response
                .json()
                .await
                .map_err(|e| PipelineError::Report(format!("{url} ({strategy}): {e}")))?;

            let categories = body.lighthouse_result.categories;
            Ok(Scores {
                performance: categories.performance.and_then(|c| c.score),
                accessibility: categories.accessibility.and_then(|c| c.score),
            })
        })
    }
}

fn percent(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{}", (s * 100.0).round() as i64),
        None => "n/a".to_string(),
    }
}

/// Score every page for each strategy in order and print the results to
/// `out`. The first failed request aborts the report.
pub async fn run_report<C, W>(
    client: &C,
    ctx: &ReportContext,
    strategies: &[Strategy],
    delay: Duration,
    out: &mut W,
) -> Result<()>
where
    C: ScoreClient + ?Sized,
    W: Write,
{
    info!(pages = ctx.pages.len(), "running PageSpeed report");

    for &strategy in strategies {
        writeln!(out, "--------------------------------------")?;
        writeln!(out, "{} PSI REPORT", strategy.as_str().to_uppercase())?;
        writeln!(out, "--------------------------------------")?;

        for page in &ctx.pages {
            let url = ctx.page_url(page);
            let scores = client.score(&url, strategy).await?;

            writeln!(out, "{url}")?;
            writeln!(out, "Speed score: {}", percent(scores.performance))?;
            if strategy == Strategy::Mobile {
                writeln!(out, "Usability score: {}", percent(scores.accessibility))?;
            }
            writeln!(out, "---")?;

            tokio::time::sleep(delay).await;
        }
    }

    info!("PageSpeed report finished");
    Ok(())
}
