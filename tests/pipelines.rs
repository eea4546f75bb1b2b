// tests/pipelines.rs

use frontpipe::cli::PipelineName;
use frontpipe::errors::PipelineError;
use frontpipe::exec::FailurePolicy;
use frontpipe::plan::{Pipeline, Step, parallel, series, validate_step};
use frontpipe::registry::PathRegistry;
use frontpipe::task::{CssBundle, FontFormat, JsBundle, TaskId};
use frontpipe::types::Target;
use frontpipe_test_utils::ConfigFileBuilder;

fn pipeline(name: PipelineName) -> Pipeline {
    let cfg = ConfigFileBuilder::new().build();
    let registry = PathRegistry::new("proj", &cfg.paths);
    Pipeline::for_name(name, &registry, &cfg)
}

#[test]
fn every_pipeline_and_binding_validates() {
    for name in [PipelineName::Serve, PipelineName::Lib, PipelineName::Build] {
        let p = pipeline(name);
        if let Err(err) = p.validate() {
            panic!("{name} failed validation: {err}");
        }
    }
}

#[test]
fn serve_plan_cleans_then_generates_in_order() {
    let p = pipeline(PipelineName::Serve);
    let tasks = p.plan.tasks();

    assert_eq!(tasks.first(), Some(&TaskId::CleanDev));
    assert_eq!(tasks.last(), Some(&TaskId::ExportAssets));
    let sprite = tasks.iter().position(|t| *t == TaskId::CompileSvgSprite);
    let html = tasks.iter().position(|t| *t == TaskId::CompileHtml);
    assert!(sprite < html);
    assert_eq!(p.policy, FailurePolicy::Isolate);
    assert_eq!(p.server.port, 8080);
    assert!(p.server.tunnel);
    assert!(!p.report);
    assert_eq!(p.bindings.len(), 16);
}

#[test]
fn lib_plan_and_bindings_target_the_library_tree() {
    let p = pipeline(PipelineName::Lib);
    let tasks = p.plan.tasks();

    assert_eq!(tasks[0], TaskId::CleanLibrary);
    assert_eq!(tasks[1], TaskId::CompileHtmlLib);
    let js: Vec<TaskId> = tasks
        .iter()
        .copied()
        .filter(|t| matches!(t, TaskId::CompileJs(..)))
        .collect();
    assert_eq!(
        js,
        vec![
            TaskId::CompileJs(JsBundle::Common, Target::Library),
            TaskId::CompileJs(JsBundle::Vendors, Target::Library),
            TaskId::CompileJs(JsBundle::Components, Target::Library),
            TaskId::CompileJs(JsBundle::UiKit, Target::Library),
        ]
    );
    assert!(!p.server.tunnel);
    assert_eq!(p.server.target, Target::Library);

    let labels: Vec<&str> = p.bindings.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["html-lib", "css-lib", "js-lib"]);
    assert!(matches!(&p.bindings[1].step, Step::Parallel(children) if children.len() == 4));
}

#[test]
fn build_plan_aborts_on_failure_and_reports() {
    let p = pipeline(PipelineName::Build);
    assert_eq!(
        p.plan.tasks(),
        vec![
            TaskId::CleanBuild,
            TaskId::BuildHtml,
            TaskId::BuildCss,
            TaskId::BuildJs,
            TaskId::BuildFonts,
            TaskId::ExportImages,
            TaskId::ExportFiles,
        ]
    );
    assert_eq!(p.policy, FailurePolicy::Abort);
    assert_eq!(p.server.port, 5000);
    assert!(p.report);
    assert!(p.bindings.is_empty());
}

#[test]
fn generation_before_its_clean_is_rejected() {
    let step = series([
        Step::Task(TaskId::CompileHtml),
        Step::Task(TaskId::CleanDev),
    ]);
    let err = validate_step(&step).expect_err("clean after writer must fail");
    assert!(matches!(err, PipelineError::PlanOrder(_)));
    assert!(err.to_string().contains("clean-dev"));
}

#[test]
fn clean_running_in_parallel_with_its_writer_is_rejected() {
    let step = parallel([
        TaskId::CleanFonts,
        TaskId::ConvertFonts(FontFormat::Woff),
    ]);
    assert!(matches!(validate_step(&step), Err(PipelineError::PlanOrder(_))));
}

#[test]
fn reader_before_writer_is_rejected() {
    let step = series([
        Step::Task(TaskId::CompileCss(CssBundle::General, Target::Dev)),
        Step::Task(TaskId::CompilePngSprite),
    ]);
    let err = validate_step(&step).expect_err("sprite must precede its stylesheet");
    assert!(err.to_string().contains("compile-png-sprite"));
}

#[test]
fn duplicate_tasks_are_rejected() {
    let step = series([TaskId::CompileSvgSprite, TaskId::CompileSvgSprite]);
    let err = validate_step(&step).expect_err("duplicate must fail");
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn artifacts_produced_outside_the_plan_are_assumed_present() {
    // `build-html` reads the dev pages, which the build plan never writes.
    let step = series([TaskId::CleanBuild, TaskId::BuildHtml]);
    assert!(validate_step(&step).is_ok());
}

#[test]
fn task_names_carry_the_library_suffix() {
    assert_eq!(
        TaskId::CompileCss(CssBundle::UiKit, Target::Library).name(),
        "compile-css-ui-kit-lib"
    );
    assert_eq!(TaskId::CompileJs(JsBundle::Common, Target::Dev).name(), "compile-js-common");
    assert_eq!(TaskId::ConvertFonts(FontFormat::Woff2).name(), "convert-fonts-woff2");
}

#[test]
fn describe_lists_plan_and_bindings() {
    let text = pipeline(PipelineName::Serve).describe();
    assert!(text.starts_with("pipeline: serve\n"));
    assert!(text.contains("  clean-dev\n"));
    assert!(text.contains("watch css-general [change] src/styles/**/*.scss"));
    assert!(text.contains("watch fonts [all] src/fonts/*.ttf"));
}

#[test]
fn cli_takes_a_pipeline_and_global_flags() {
    use clap::Parser;
    use frontpipe::cli::CliArgs;

    let args = CliArgs::try_parse_from(["frontpipe", "build", "--once", "--config", "site/Frontpipe.toml"])
        .expect("valid arguments");
    assert_eq!(args.pipeline, PipelineName::Build);
    assert!(args.once);
    assert!(!args.dry_run);
    assert_eq!(args.config, "site/Frontpipe.toml");

    assert!(CliArgs::try_parse_from(["frontpipe", "deploy"]).is_err());
}
