// src/config/validate.rs

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile, parse_duration};
use crate::errors::{PipelineError, Result};
use crate::watch::path_utils::normalize_lexically;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PipelineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        let tunnel_startup_timeout = duration_field("[tunnel].startup_timeout", &raw.tunnel.startup_timeout)?;
        let report_delay = duration_field("[report].delay", &raw.report.delay)?;
        Ok(ConfigFile::new_unchecked(raw, tunnel_startup_timeout, report_delay))
    }
}

/// Run every semantic check on a raw config.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_roots(cfg)?;
    validate_server(cfg)?;
    validate_tools(cfg)?;
    validate_tunnel(cfg)?;
    validate_report(cfg)?;
    Ok(())
}

fn validate_roots(cfg: &RawConfigFile) -> Result<()> {
    let roots = [
        ("src", &cfg.paths.src),
        ("dev", &cfg.paths.dev),
        ("build", &cfg.paths.build),
        ("library", &cfg.paths.library),
    ];

    for (name, value) in roots.iter() {
        if value.trim().is_empty() {
            return Err(PipelineError::ConfigError(format!(
                "[paths].{name} must not be empty"
            )));
        }
    }

    for (i, (name_a, a)) in roots.iter().enumerate() {
        for (name_b, b) in roots.iter().skip(i + 1) {
            if normalize(a) == normalize(b) {
                return Err(PipelineError::ConfigError(format!(
                    "[paths].{name_a} and [paths].{name_b} point to the same directory '{a}'"
                )));
            }
        }
    }

    // Output roots are deleted wholesale by the clean tasks, so none of them
    // may contain the source tree.
    let src = normalize(&cfg.paths.src);
    for (name, value) in roots.iter().skip(1) {
        let out = normalize(value);
        if src.starts_with(&out) {
            return Err(PipelineError::ConfigError(format!(
                "[paths].{name} = '{value}' contains the source root '{}'",
                cfg.paths.src
            )));
        }
    }

    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.dev_port == 0 {
        return Err(PipelineError::ConfigError(
            "[server].dev_port must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.server.build_port == 0 {
        return Err(PipelineError::ConfigError(
            "[server].build_port must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<()> {
    let fonts = [
        ("woff", &cfg.tools.woff),
        ("woff2", &cfg.tools.woff2),
        ("eot", &cfg.tools.eot),
    ];
    for (name, template) in fonts {
        if !template.contains("{input}") || !template.contains("{output}") {
            return Err(PipelineError::ConfigError(format!(
                "[tools].{name} must reference both {{input}} and {{output}} (got '{template}')"
            )));
        }
    }

    let optional = [
        ("js_transpile", &cfg.tools.js_transpile, true),
        ("svg_optimize", &cfg.tools.svg_optimize, true),
        ("image_optimize", &cfg.tools.image_optimize, true),
        ("js_lint", &cfg.tools.js_lint, false),
        ("css_lint", &cfg.tools.css_lint, false),
    ];
    for (name, template, needs_output) in optional {
        let Some(template) = template else { continue };
        if !template.contains("{input}") {
            return Err(PipelineError::ConfigError(format!(
                "[tools].{name} must reference {{input}} (got '{template}')"
            )));
        }
        if needs_output && !template.contains("{output}") {
            return Err(PipelineError::ConfigError(format!(
                "[tools].{name} must reference {{output}} (got '{template}')"
            )));
        }
    }

    Ok(())
}

fn validate_tunnel(cfg: &RawConfigFile) -> Result<()> {
    if !cfg.tunnel.enabled {
        return Ok(());
    }

    if !cfg.tunnel.cmd.contains("{port}") {
        return Err(PipelineError::ConfigError(format!(
            "[tunnel].cmd must reference {{port}} (got '{}')",
            cfg.tunnel.cmd
        )));
    }

    let re = Regex::new(&cfg.tunnel.url_pattern).map_err(|e| {
        PipelineError::ConfigError(format!("[tunnel].url_pattern is not a valid regex: {e}"))
    })?;
    if re.captures_len() < 2 {
        return Err(PipelineError::ConfigError(
            "[tunnel].url_pattern must capture the public URL in a group".to_string(),
        ));
    }

    Ok(())
}

fn validate_report(cfg: &RawConfigFile) -> Result<()> {
    if cfg.report.enabled && cfg.report.strategies.is_empty() {
        return Err(PipelineError::ConfigError(
            "[report].strategies must not be empty when the report is enabled".to_string(),
        ));
    }
    Ok(())
}

fn duration_field(name: &str, value: &str) -> Result<std::time::Duration> {
    parse_duration(value).map_err(|e| PipelineError::ConfigError(format!("{name}: {e}")))
}

fn normalize(path: &str) -> PathBuf {
    normalize_lexically(Path::new(path.trim()))
}
