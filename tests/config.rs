// tests/config.rs

use std::error::Error;
use std::time::Duration;

use frontpipe::config::{ConfigFile, RawConfigFile, load_or_default, parse_duration};
use frontpipe::errors::PipelineError;
use frontpipe::types::Strategy;
use frontpipe_test_utils::{ConfigFileBuilder, ProjectFixture};

type TestResult = Result<(), Box<dyn Error>>;

fn rejects(raw: RawConfigFile, needle: &str) {
    match ConfigFile::try_from(raw) {
        Err(PipelineError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} lacks {needle:?}")
        }
        other => panic!("expected config error containing {needle:?}, got {other:?}"),
    }
}

#[test]
fn defaults_are_valid() -> TestResult {
    let cfg = ConfigFile::try_from(RawConfigFile::default())?;
    assert_eq!(cfg.server.dev_port, 8080);
    assert_eq!(cfg.server.build_port, 5000);
    assert_eq!(cfg.sprite.padding, 20);
    assert_eq!(cfg.tunnel_startup_timeout, Duration::from_secs(30));
    assert_eq!(cfg.report_delay, Duration::from_secs(1));
    assert_eq!(cfg.report.strategies, vec![Strategy::Desktop, Strategy::Mobile]);
    Ok(())
}

#[test]
fn missing_file_falls_back_to_defaults() -> TestResult {
    let project = ProjectFixture::new();
    let cfg = load_or_default(project.path("Frontpipe.toml"))?;
    assert_eq!(cfg.paths.dev, "dev");
    Ok(())
}

#[test]
fn partial_file_keeps_other_defaults() -> TestResult {
    let project = ProjectFixture::new();
    let path = project.write(
        "Frontpipe.toml",
        "[server]\ndev_port = 3000\n\n[report]\nstrategies = [\"mobile\"]\ndelay = \"250ms\"\n",
    );

    let cfg = load_or_default(path)?;

    assert_eq!(cfg.server.dev_port, 3000);
    assert_eq!(cfg.server.build_port, 5000);
    assert_eq!(cfg.report.strategies, vec![Strategy::Mobile]);
    assert_eq!(cfg.report_delay, Duration::from_millis(250));
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() {
    let project = ProjectFixture::new();
    let path = project.write("Frontpipe.toml", "[server]\nportt = 1\n");
    assert!(matches!(load_or_default(path), Err(PipelineError::TomlError(_))));
}

#[test]
fn equal_roots_are_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_roots("src", "out", "./out", "library")
        .raw();
    rejects(raw, "same directory");
}

#[test]
fn output_root_containing_sources_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_roots("site/src", "site", "build", "library")
        .raw();
    rejects(raw, "contains the source root");
}

#[test]
fn port_zero_is_rejected() {
    let raw = ConfigFileBuilder::new().with_ports(0, 5000).raw();
    rejects(raw, "dev_port");
}

#[test]
fn font_tool_without_output_is_rejected() {
    let mut raw = ConfigFileBuilder::new().raw();
    raw.tools.woff2 = "ttf2woff2 {input}".to_string();
    rejects(raw, "[tools].woff2");
}

#[test]
fn lint_tool_needs_only_input() -> TestResult {
    let cfg = ConfigFileBuilder::new().with_js_lint("eslint {input}").raw();
    ConfigFile::try_from(cfg)?;

    let bad = ConfigFileBuilder::new().with_js_lint("eslint src").raw();
    rejects(bad, "[tools].js_lint");
    Ok(())
}

#[test]
fn tunnel_pattern_needs_a_capture_group() {
    let raw = ConfigFileBuilder::new()
        .with_tunnel("tunnel --port {port}", r"https://\S+", "5s")
        .raw();
    rejects(raw, "capture");

    let raw = ConfigFileBuilder::new()
        .with_tunnel("tunnel --port 80", r"(https://\S+)", "5s")
        .raw();
    rejects(raw, "{port}");
}

#[test]
fn bad_durations_are_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_tunnel("tunnel {port}", r"(https://\S+)", "soon")
        .raw();
    rejects(raw, "[tunnel].startup_timeout");

    assert!(parse_duration("10").is_err());
    assert!(parse_duration("3d").is_err());
    assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
}

#[test]
fn overflowing_durations_are_rejected() {
    assert!(parse_duration("18446744073709551615m").is_err());
    assert!(parse_duration("9999999999999999999h").is_err());
    assert_eq!(
        parse_duration("5124095576030431h"),
        Ok(Duration::from_secs(5124095576030431 * 3600))
    );

    let raw = ConfigFileBuilder::new()
        .with_report(&[Strategy::Desktop], "99999999999999999h")
        .raw();
    rejects(raw, "too large");
}

#[test]
fn enabled_report_needs_a_strategy() {
    let raw = ConfigFileBuilder::new().with_report(&[], "1s").raw();
    rejects(raw, "[report].strategies");
}
