// src/task/css.rs

//! Stylesheet tasks.
//!
//! SCSS is compiled with `grass`; media-query grouping, vendor prefixing and
//! minification go through the `lightningcss` rule tree.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use lightningcss::traits::ToCss;
use tracing::{debug, warn};

use super::{CssBundle, TaskContext, TaskReport, blocking};
use crate::config::BrowserFloor;
use crate::exec::tool::run_tool;
use crate::types::Target;

/// Convert the configured browser floor into prefixer targets.
pub fn browser_targets(floor: &BrowserFloor) -> Targets {
    // lightningcss encodes versions as `major << 16 | minor << 8 | patch`.
    let v = |major: Option<u32>| major.map(|m| m << 16);
    Targets::from(Browsers {
        android: v(floor.android),
        chrome: v(floor.chrome),
        edge: v(floor.edge),
        firefox: v(floor.firefox),
        ie: v(floor.ie),
        ios_saf: v(floor.ios_saf),
        opera: v(floor.opera),
        safari: v(floor.safari),
        samsung: v(floor.samsung),
    })
}

/// Post-processing applied to compiled CSS.
#[derive(Debug, Clone, Copy)]
pub struct CssPass {
    /// Merge `@media` blocks with equal queries and move them after the
    /// plain rules.
    pub group_media: bool,
    pub minify: bool,
}

/// Group media queries, add vendor prefixes and print.
pub fn process_css(source: &str, targets: Targets, pass: CssPass) -> Result<String> {
    let mut sheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| anyhow!("parsing CSS: {e}"))?;

    if pass.group_media {
        let rules = std::mem::take(&mut sheet.rules.0);
        let mut plain = Vec::with_capacity(rules.len());
        let mut groups: Vec<(String, CssRule)> = Vec::new();

        for rule in rules {
            match rule {
                CssRule::Media(media) => {
                    let key = media
                        .query
                        .to_css_string(PrinterOptions::default())
                        .map_err(|e| anyhow!("printing media query: {e}"))?;
                    match groups.iter_mut().find(|(k, _)| *k == key) {
                        Some((_, CssRule::Media(existing))) => {
                            existing.rules.0.extend(media.rules.0);
                        }
                        _ => groups.push((key, CssRule::Media(media))),
                    }
                }
                other => plain.push(other),
            }
        }

        plain.extend(groups.into_iter().map(|(_, rule)| rule));
        sheet.rules.0 = plain;
    }

    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("prefixing CSS: {e}"))?;

    let printed = sheet
        .to_css(PrinterOptions {
            minify: pass.minify,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("printing CSS: {e}"))?;

    Ok(printed.code)
}

/// Compile one SCSS entry file to readable, prefixed CSS.
fn compile_bundle(ctx: &TaskContext, bundle: CssBundle) -> Result<Option<String>> {
    let src = &ctx.registry.src;
    let entry = src.styles.join(format!("{}.scss", bundle.file_stem()));
    if !ctx.fs.is_file(&entry) {
        return Ok(None);
    }

    // Compiled from its path so relative imports resolve against the entry's directory.
    let options = grass::Options::default()
        .load_path(&src.styles)
        .load_path(&src.root)
        .style(grass::OutputStyle::Expanded);
    let css = grass::from_path(&entry, &options)
        .map_err(|e| anyhow!("compiling {}: {e}", ctx.registry.rel(&entry)))?;

    let pass = CssPass {
        group_media: true,
        minify: false,
    };
    process_css(&css, browser_targets(&ctx.css.browsers), pass).map(Some)
}

/// `compile-css-<bundle>` and `compile-css-<bundle>-lib`.
pub async fn compile_css(
    ctx: &Arc<TaskContext>,
    bundle: CssBundle,
    target: Target,
) -> Result<TaskReport> {
    let out = ctx
        .registry
        .styles_dir(target)
        .join(format!("{}.css", bundle.file_stem()));

    let written = blocking(ctx, {
        let out = out.clone();
        move |ctx: &TaskContext| {
            let Some(css) = compile_bundle(ctx, bundle)? else {
                warn!(bundle = bundle.name(), "entry stylesheet missing; nothing to compile");
                return Ok(false);
            };
            debug!(out = %ctx.registry.rel(&out), "writing stylesheet");
            ctx.fs.write(&out, css.as_bytes())?;
            Ok(true)
        }
    })
    .await?;

    if !written {
        return Ok(TaskReport::default());
    }

    if target == Target::Dev && bundle.linted() {
        if let Some(lint) = &ctx.tools.css_lint {
            run_tool("css_lint", lint, &out, None).await?;
        }
    }

    Ok(TaskReport::written(1))
}

/// `build-css`: concatenate the four development bundles, then minify.
pub fn build_css(ctx: &TaskContext) -> Result<TaskReport> {
    let dev_styles = &ctx.registry.dev.styles;
    let mut parts = Vec::new();
    for bundle in CssBundle::ALL {
        let path = dev_styles.join(format!("{}.css", bundle.file_stem()));
        if !ctx.fs.is_file(&path) {
            warn!(file = %ctx.registry.rel(&path), "bundle missing; skipped");
            continue;
        }
        parts.push(ctx.fs.read_to_string(&path)?);
    }

    let merged = parts.join("\n");
    let out_dir = &ctx.registry.build.styles;
    ctx.fs.write(&out_dir.join("style.css"), merged.as_bytes())?;

    let pass = CssPass {
        group_media: false,
        minify: true,
    };
    let minified = process_css(&merged, browser_targets(&ctx.css.browsers), pass)?;
    ctx.fs.write(&out_dir.join("style.min.css"), minified.as_bytes())?;

    Ok(TaskReport::written(2))
}
