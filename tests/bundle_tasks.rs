// tests/bundle_tasks.rs

use std::error::Error;

use frontpipe::config::BrowserFloor;
use frontpipe::task::css::{CssPass, browser_targets, process_css};
use frontpipe::task::js::minify_js;
use frontpipe::task::{CssBundle, JsBundle, TaskId, run_task};
use frontpipe::types::Target;
use frontpipe_test_utils::{ConfigFileBuilder, ProjectFixture, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in {haystack:?}"))
}

#[tokio::test]
async fn production_script_keeps_evaluation_order() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    // Written in reverse so directory order cannot explain the result.
    for bundle in ["components", "ui-kit", "common", "vendors"] {
        let marker = bundle.replace('-', "_");
        project.write(
            &format!("dev/js/{bundle}.js"),
            format!("var marker_{marker} = \"{bundle}\";\n"),
        );
    }
    let cfg = ConfigFileBuilder::new().build();

    run_task(TaskId::BuildJs, project.context(&cfg)).await?;

    let merged = project.read("build/js/script.js");
    let order = [
        position(&merged, "marker_vendors"),
        position(&merged, "marker_common"),
        position(&merged, "marker_ui_kit"),
        position(&merged, "marker_components"),
    ];
    assert!(order.windows(2).all(|w| w[0] < w[1]), "order was {order:?}");

    let minified = project.read("build/js/script.min.js");
    assert!(minified.len() < merged.len());
    assert!(minified.contains("marker_components"));
    Ok(())
}

#[tokio::test]
async fn production_script_skips_missing_bundles() -> TestResult {
    let project = ProjectFixture::new();
    project.write("dev/js/common.js", "var only = 1;");
    let cfg = ConfigFileBuilder::new().build();

    let report = run_task(TaskId::BuildJs, project.context(&cfg)).await?;

    assert_eq!(report.files_written, 2);
    assert_eq!(project.read("build/js/script.js"), "var only = 1;");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn transpiler_output_is_staged_outside_the_build_tree() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    project.write("dev/js/vendors.js", "var vendor = 1;");
    let cfg = ConfigFileBuilder::new()
        .with_js_transpile("cat {input} > {output}")
        .build();

    run_task(TaskId::BuildJs, project.context(&cfg)).await?;

    assert_eq!(project.read("build/js/script.js"), "var vendor = 1;");
    assert_eq!(project.list("build/js"), vec!["script.js", "script.min.js"]);
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn failing_transpiler_leaves_no_staged_files() {
    let project = ProjectFixture::new();
    project.write("dev/js/vendors.js", "var vendor = 1;");
    let cfg = ConfigFileBuilder::new()
        .with_js_transpile("false {input} {output}")
        .build();

    let result = run_task(TaskId::BuildJs, project.context(&cfg)).await;

    assert!(result.is_err());
    assert!(!project.exists("build"));
}

#[tokio::test]
async fn script_bundles_expand_includes_except_common() -> TestResult {
    let project = ProjectFixture::new();
    project.write("src/js/ui-kit.js", "@@include('js/ui-kit/button.js')");
    project.write("src/js/ui-kit/button.js", "var button = 1;\n");
    project.write("src/js/common.js", "// @@include('nothing.js')\n");
    let cfg = ConfigFileBuilder::new().build();
    let ctx = project.context(&cfg);

    run_task(TaskId::CompileJs(JsBundle::UiKit, Target::Dev), ctx.clone()).await?;
    run_task(TaskId::CompileJs(JsBundle::Common, Target::Dev), ctx.clone()).await?;
    run_task(TaskId::CompileJs(JsBundle::UiKit, Target::Library), ctx).await?;

    assert_eq!(project.read("dev/js/ui-kit.js"), "var button = 1;");
    assert_eq!(project.read("dev/js/common.js"), "// @@include('nothing.js')\n");
    assert_eq!(project.read("library/js/ui-kit.js"), "var button = 1;");
    Ok(())
}

#[tokio::test]
async fn missing_script_entry_is_skipped() -> TestResult {
    let project = ProjectFixture::new();
    let cfg = ConfigFileBuilder::new().build();

    let report = run_task(
        TaskId::CompileJs(JsBundle::Vendors, Target::Dev),
        project.context(&cfg),
    )
    .await?;

    assert_eq!(report.files_written, 0);
    assert!(!project.exists("dev/js/vendors.js"));
    Ok(())
}

#[test]
fn js_minification_drops_comments() {
    let out = minify_js("// header\nfunction add(a, b) {\n    return a + b;\n}\n");
    assert!(!out.contains("header"));
    assert!(out.contains("function add"));
}

#[test]
fn media_queries_are_grouped_after_plain_rules() -> Result<(), Box<dyn Error>> {
    let source = concat!(
        "@media (min-width: 10px) { .a { color: red; } }\n",
        ".b { color: blue; }\n",
        "@media (min-width: 20px) { .c { color: green; } }\n",
        "@media (min-width: 10px) { .d { color: black; } }\n",
    );
    let pass = CssPass {
        group_media: true,
        minify: false,
    };
    let out = process_css(source, browser_targets(&BrowserFloor::default()), pass)?;

    assert_eq!(out.matches("@media").count(), 2);
    let [a, b, c, d] = [".a", ".b", ".c", ".d"].map(|sel| position(&out, sel));
    assert!(b < a && a < d && d < c, "unexpected layout:\n{out}");
    Ok(())
}

#[test]
fn old_browser_floor_adds_vendor_prefixes() -> Result<(), Box<dyn Error>> {
    let floor = BrowserFloor {
        android: None,
        chrome: Some(20),
        edge: None,
        firefox: None,
        ie: None,
        ios_saf: None,
        opera: None,
        safari: Some(5),
        samsung: None,
    };
    let pass = CssPass {
        group_media: false,
        minify: false,
    };
    let out = process_css(".a { user-select: none; }", browser_targets(&floor), pass)?;
    assert!(out.contains("-webkit-user-select"), "no prefix in:\n{out}");
    Ok(())
}

#[tokio::test]
async fn scss_entry_compiles_with_grouped_media() -> TestResult {
    let project = ProjectFixture::new();
    project.write(
        "src/styles/dependencies/_vars.scss",
        "$gap: 4px;\n",
    );
    project.write(
        "src/styles/style.scss",
        concat!(
            "@import 'dependencies/vars';\n",
            ".a { margin: $gap; }\n",
            "@media (max-width: 600px) { .a { margin: 0; } }\n",
            ".b { padding: $gap * 2; }\n",
            "@media (max-width: 600px) { .b { padding: 0; } }\n",
        ),
    );
    let cfg = ConfigFileBuilder::new().build();

    run_task(
        TaskId::CompileCss(CssBundle::General, Target::Dev),
        project.context(&cfg),
    )
    .await?;

    let css = project.read("dev/styles/style.css");
    assert_eq!(css.matches("@media").count(), 1);
    assert!(position(&css, ".b") < position(&css, "@media"));
    assert!(css.contains("8px"));
    Ok(())
}

#[tokio::test]
async fn scss_partials_resolve_relative_to_the_importing_file() -> TestResult {
    let project = ProjectFixture::new();
    project.write("src/styles/ui-kit.scss", "@import 'ui-kit/button';\n");
    project.write("src/styles/ui-kit/_button.scss", "@import 'size';\n.button { height: $size; }\n");
    project.write("src/styles/ui-kit/_size.scss", "$size: 40px;\n");
    let cfg = ConfigFileBuilder::new().build();

    run_task(
        TaskId::CompileCss(CssBundle::UiKit, Target::Dev),
        project.context(&cfg),
    )
    .await?;

    let css = project.read("dev/styles/ui-kit.css");
    assert!(css.contains(".button"));
    assert!(css.contains("40px"));
    Ok(())
}

#[tokio::test]
async fn production_stylesheet_concatenates_bundles_in_order() -> TestResult {
    let project = ProjectFixture::new();
    project.write("dev/styles/components.css", ".components { color: green; }\n");
    project.write("dev/styles/ui-kit.css", ".ui-kit { color: blue; }\n");
    project.write("dev/styles/vendors.css", ".vendors { color: black; }\n");
    project.write("dev/styles/style.css", ".general { color: red; }\n");
    let cfg = ConfigFileBuilder::new().build();

    run_task(TaskId::BuildCss, project.context(&cfg)).await?;

    let merged = project.read("build/styles/style.css");
    let order = [
        position(&merged, ".general"),
        position(&merged, ".vendors"),
        position(&merged, ".ui-kit"),
        position(&merged, ".components"),
    ];
    assert!(order.windows(2).all(|w| w[0] < w[1]), "order was {order:?}");

    let minified = project.read("build/styles/style.min.css");
    assert!(minified.contains(".general{color:red}"));
    assert!(!minified.contains('\n'));
    Ok(())
}
