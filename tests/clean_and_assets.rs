// tests/clean_and_assets.rs

use std::error::Error;

use frontpipe::config::ConfigFile;
use frontpipe::errors::PipelineError;
use frontpipe::exec::{ExecutorBackend, FailurePolicy, PlanExecutor, TaskOutcome};
use frontpipe::plan::{Step, series};
use frontpipe::task::{FontFormat, TaskId, run_task};
use frontpipe_test_utils::{ConfigFileBuilder, ProjectFixture, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn cleaning_a_missing_tree_succeeds_twice() -> TestResult {
    let project = ProjectFixture::new();
    let cfg = ConfigFileBuilder::new().build();
    let ctx = project.context(&cfg);

    run_task(TaskId::CleanDev, ctx.clone()).await?;
    run_task(TaskId::CleanDev, ctx.clone()).await?;
    run_task(TaskId::CleanFonts, ctx).await?;
    assert!(!project.exists("dev"));
    Ok(())
}

#[tokio::test]
async fn clean_html_only_touches_top_level_pages() -> TestResult {
    let project = ProjectFixture::new();
    project.write("dev/index.html", "");
    project.write("dev/about.html", "");
    project.write("dev/styles/style.css", "");
    project.write("dev/assets/embed.html", "");
    let cfg = ConfigFileBuilder::new().build();

    run_task(TaskId::CleanHtml, project.context(&cfg)).await?;

    assert_eq!(project.list("dev"), vec!["assets", "styles"]);
    assert!(project.exists("dev/assets/embed.html"));
    Ok(())
}

#[tokio::test]
async fn asset_export_leaves_sprite_sources_behind() -> TestResult {
    let project = ProjectFixture::new();
    project.write("src/assets/img/photo.jpg", "jpg");
    project.write("src/assets/files/terms.pdf", "pdf");
    project.write("src/assets/img/sprite/sprite.svg", "<svg/>");
    project.write("src/assets/img/sprite/png/icon.png", "png");
    project.write("src/assets/img/sprite/svg/home.svg", "<svg/>");
    let cfg = ConfigFileBuilder::new().build();

    let report = run_task(TaskId::ExportAssets, project.context(&cfg)).await?;

    assert_eq!(report.files_written, 3);
    assert_eq!(project.read("dev/assets/files/terms.pdf"), "pdf");
    assert!(project.exists("dev/assets/img/photo.jpg"));
    assert!(project.exists("dev/assets/img/sprite/sprite.svg"));
    assert!(!project.exists("dev/assets/img/sprite/png"));
    assert!(!project.exists("dev/assets/img/sprite/svg"));
    Ok(())
}

#[tokio::test]
async fn production_copies_split_images_from_other_files() -> TestResult {
    let project = ProjectFixture::new();
    project.write("dev/assets/img/photo.jpg", "jpg");
    project.write("dev/assets/img/icons/home.svg", "<svg/>");
    project.write("dev/assets/img/notes.txt", "skip");
    project.write("dev/assets/files/terms.pdf", "pdf");
    project.write("dev/fonts/Inter.woff2", "font");
    let cfg = ConfigFileBuilder::new().build();
    let ctx = project.context(&cfg);

    let images = run_task(TaskId::ExportImages, ctx.clone()).await?;
    let files = run_task(TaskId::ExportFiles, ctx.clone()).await?;
    let fonts = run_task(TaskId::BuildFonts, ctx).await?;

    assert_eq!(images.files_written, 2);
    assert!(project.exists("build/assets/img/icons/home.svg"));
    assert!(!project.exists("build/assets/img/notes.txt"));
    assert_eq!(files.files_written, 1);
    assert_eq!(project.read("build/assets/files/terms.pdf"), "pdf");
    assert_eq!(fonts.files_written, 1);
    assert_eq!(project.read("build/fonts/Inter.woff2"), "font");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn fonts_convert_through_the_configured_tool() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    project.write("src/fonts/Inter.ttf", "ttf-bytes");
    project.write("src/fonts/readme.txt", "ignored");
    let cfg = ConfigFileBuilder::new().with_copying_font_tools().build();
    let ctx = project.context(&cfg);

    for format in FontFormat::ALL {
        run_task(TaskId::ConvertFonts(format), ctx.clone()).await?;
    }

    assert_eq!(project.list("dev/fonts"), vec!["Inter.eot", "Inter.woff", "Inter.woff2"]);
    assert_eq!(project.read("dev/fonts/Inter.woff2"), "ttf-bytes");
    Ok(())
}

fn failing_font_config() -> ConfigFile {
    let mut raw = ConfigFileBuilder::new().raw();
    raw.tools.woff = "false {input} {output}".to_string();
    ConfigFile::try_from(raw).expect("valid config")
}

fn font_then_clean() -> Step {
    series([
        Step::Task(TaskId::ConvertFonts(FontFormat::Woff)),
        Step::Task(TaskId::CleanHtml),
    ])
}

#[cfg(unix)]
#[tokio::test]
async fn isolate_policy_keeps_running_after_a_failure() -> TestResult {
    let project = ProjectFixture::new();
    project.write("src/fonts/Inter.ttf", "ttf");
    let executor = PlanExecutor::new(project.context(&failing_font_config()), FailurePolicy::Isolate);

    let summary = executor.execute(font_then_clean()).await?;

    assert!(!summary.succeeded());
    assert_eq!(
        summary.tasks(),
        vec![TaskId::ConvertFonts(FontFormat::Woff), TaskId::CleanHtml]
    );
    assert!(matches!(summary.records[0].outcome, TaskOutcome::Failed(_)));
    assert_eq!(summary.records[1].outcome, TaskOutcome::Success);
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn abort_policy_stops_at_the_first_failure() {
    let project = ProjectFixture::new();
    project.write("src/fonts/Inter.ttf", "ttf");
    project.write("dev/index.html", "stays");
    let executor = PlanExecutor::new(project.context(&failing_font_config()), FailurePolicy::Abort);

    let result = executor.execute(font_then_clean()).await;

    match result {
        Err(PipelineError::TaskFailed { task, .. }) => assert_eq!(task, "convert-fonts-woff"),
        other => panic!("expected task failure, got {other:?}"),
    }
    assert!(project.exists("dev/index.html"));
}
