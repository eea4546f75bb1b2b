// tests/report.rs

use std::error::Error;
use std::path::Path;
use std::time::Duration;

use frontpipe::errors::PipelineError;
use frontpipe::fs::RealFileSystem;
use frontpipe::fs::mock::MockFileSystem;
use frontpipe::report::{ReportContext, run_report};
use frontpipe::types::Strategy;
use frontpipe_test_utils::{FakeScoreClient, ProjectFixture};

type TestResult = Result<(), Box<dyn Error>>;

fn context() -> ReportContext {
    ReportContext {
        base_url: "https://abc.example.app/".to_string(),
        pages: vec!["about.html".to_string(), "index.html".to_string()],
    }
}

#[test]
fn pages_are_the_sorted_top_level_html_files() -> TestResult {
    let project = ProjectFixture::new();
    project.write("build/index.html", "");
    project.write("build/about.html", "");
    project.write("build/styles/style.css", "");
    project.write("build/nested/page.html", "");

    let ctx = ReportContext::from_build_dir("https://x.dev", &RealFileSystem, &project.path("build"))?;

    assert_eq!(ctx.pages, vec!["about.html", "index.html"]);
    assert_eq!(ctx.page_url("index.html"), "https://x.dev/index.html");
    Ok(())
}

#[test]
fn missing_build_tree_has_no_pages() -> TestResult {
    let fs = MockFileSystem::new();
    let ctx = ReportContext::from_build_dir("https://x.dev", &fs, Path::new("build"))?;
    assert!(ctx.pages.is_empty());
    Ok(())
}

#[tokio::test]
async fn desktop_pass_precedes_mobile_pass() -> TestResult {
    let client = FakeScoreClient::new(0.9, 0.8);
    let mut out = Vec::new();

    run_report(
        &client,
        &context(),
        &[Strategy::Desktop, Strategy::Mobile],
        Duration::ZERO,
        &mut out,
    )
    .await?;

    let calls = client.calls();
    let strategies: Vec<Strategy> = calls.iter().map(|(_, s)| *s).collect();
    assert_eq!(
        strategies,
        vec![Strategy::Desktop, Strategy::Desktop, Strategy::Mobile, Strategy::Mobile]
    );
    assert_eq!(calls[0].0, "https://abc.example.app/about.html");

    let text = String::from_utf8(out)?;
    let desktop = text.find("DESKTOP PSI REPORT").ok_or("no desktop header")?;
    let mobile = text.find("MOBILE PSI REPORT").ok_or("no mobile header")?;
    assert!(desktop < mobile);
    assert_eq!(text.matches("Speed score: 90").count(), 4);
    assert_eq!(text.matches("Usability score: 80").count(), 2);
    assert!(!text[..mobile].contains("Usability score"));
    Ok(())
}

#[tokio::test]
async fn first_failed_request_aborts_the_report() {
    let client = FakeScoreClient::new(0.5, 0.5).failing_on("about.html");
    let mut out = Vec::new();

    let result = run_report(
        &client,
        &context(),
        &[Strategy::Desktop, Strategy::Mobile],
        Duration::ZERO,
        &mut out,
    )
    .await;

    assert!(matches!(result, Err(PipelineError::Report(_))));
    assert_eq!(client.calls().len(), 1);
}
