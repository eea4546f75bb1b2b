// src/task/js.rs

//! Script tasks.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::include::{IncludeContext, IncludeExpander};
use super::{JsBundle, TaskContext, TaskReport, blocking};
use crate::exec::tool::run_tool;
use crate::types::Target;

/// Merged production script, before and after minification.
pub const BUILD_SCRIPT: &str = "script.js";
pub const BUILD_SCRIPT_MIN: &str = "script.min.js";

/// Minify a script with the `minifier` crate.
pub fn minify_js(source: &str) -> String {
    minifier::js::minify(source).to_string()
}

/// `compile-js-<bundle>` and `compile-js-<bundle>-lib`.
pub async fn compile_js(ctx: &Arc<TaskContext>, bundle: JsBundle, target: Target) -> Result<TaskReport> {
    let entry = ctx.registry.src.js.join(format!("{}.js", bundle.name()));
    let out = ctx.registry.js_dir(target).join(format!("{}.js", bundle.name()));

    let written = blocking(ctx, {
        let out = out.clone();
        move |ctx: &TaskContext| {
            if !ctx.fs.is_file(&entry) {
                warn!(bundle = bundle.name(), "entry script missing; nothing to compile");
                return Ok(false);
            }
            let source = if bundle.expands_includes() {
                IncludeExpander::new(ctx.fs.as_ref(), &ctx.registry.src.root)
                    .expand_path(&entry, &IncludeContext::new())
                    .with_context(|| format!("expanding {}", ctx.registry.rel(&entry)))?
            } else {
                ctx.fs.read_to_string(&entry)?
            };
            debug!(out = %ctx.registry.rel(&out), "writing script");
            ctx.fs.write(&out, source.as_bytes())?;
            Ok(true)
        }
    })
    .await?;

    if !written {
        return Ok(TaskReport::default());
    }

    if bundle.linted() {
        if let Some(lint) = &ctx.tools.js_lint {
            run_tool("js_lint", lint, &out, None).await?;
        }
    }

    Ok(TaskReport::written(1))
}

/// `build-js`: transpile, concatenate in evaluation order, minify.
pub async fn build_js(ctx: &Arc<TaskContext>) -> Result<TaskReport> {
    let dev_js = &ctx.registry.dev.js;
    let mut parts = Vec::with_capacity(JsBundle::ALL.len());

    // Transpiler output stays out of the build tree and is removed on drop.
    let staging = match ctx.tools.js_transpile {
        Some(_) => Some(
            tempfile::Builder::new()
                .prefix("frontpipe-js")
                .tempdir()
                .context("creating transpile staging dir")?,
        ),
        None => None,
    };

    for bundle in JsBundle::ALL {
        let path = dev_js.join(format!("{}.js", bundle.name()));
        if !ctx.fs.is_file(&path) {
            warn!(file = %ctx.registry.rel(&path), "bundle missing; skipped");
            continue;
        }

        let source = match (&ctx.tools.js_transpile, &staging) {
            (Some(transpile), Some(dir)) => {
                let staged = dir.path().join(format!("{}.js", bundle.name()));
                run_tool("js_transpile", transpile, &path, Some(&staged)).await?;
                ctx.fs.read_to_string(&staged)?
            }
            _ => ctx.fs.read_to_string(&path)?,
        };
        parts.push(source);
    }

    let merged = parts.join("\n");
    blocking(ctx, move |ctx: &TaskContext| {
        let out_dir = &ctx.registry.build.js;
        ctx.fs.write(&out_dir.join(BUILD_SCRIPT), merged.as_bytes())?;
        ctx.fs.write(&out_dir.join(BUILD_SCRIPT_MIN), minify_js(&merged).as_bytes())?;
        Ok(TaskReport::written(2))
    })
    .await
}
