// src/task/sprite/svg.rs

use std::sync::{Arc, LazyLock};

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use tracing::{debug, warn};

use crate::exec::tool::run_tool;
use crate::task::{TaskContext, TaskReport, blocking};

static SVG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<svg\b([^>]*)>(.*)</svg>").expect("static regex"));
static VIEWBOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"viewBox\s*=\s*["']([^"']*)["']"#).expect("static regex"));
static WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bwidth\s*=\s*["']([\d.]+)(?:px)?["']"#).expect("static regex"));
static HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bheight\s*=\s*["']([\d.]+)(?:px)?["']"#).expect("static regex"));

/// Turn one SVG document into a `<symbol>` with the given id.
///
/// The root element's `viewBox` is kept; without one it is derived from
/// `width`/`height`.
pub fn to_symbol(id: &str, svg: &str) -> Result<String> {
    let caps = SVG_RE
        .captures(svg)
        .ok_or_else(|| anyhow!("no <svg> root element"))?;
    let attrs = &caps[1];
    let body = caps[2].trim();

    let view_box = match VIEWBOX_RE.captures(attrs) {
        Some(vb) => Some(vb[1].to_string()),
        None => match (WIDTH_RE.captures(attrs), HEIGHT_RE.captures(attrs)) {
            (Some(w), Some(h)) => Some(format!("0 0 {} {}", &w[1], &h[1])),
            _ => None,
        },
    };

    Ok(match view_box {
        Some(vb) => format!(r#"<symbol id="{id}" viewBox="{vb}">{body}</symbol>"#),
        None => format!(r#"<symbol id="{id}">{body}</symbol>"#),
    })
}

/// Wrap symbols into one inline document (no XML prolog).
pub fn sprite_document(symbols: &[String]) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">{}</svg>"#,
        symbols.concat()
    )
}

/// `compile-svg-sprite`: `<src>/assets/img/sprite/svg/*.svg` into
/// `<src>/assets/img/sprite/sprite.svg`.
pub async fn compile_svg_sprite(ctx: &Arc<TaskContext>) -> Result<TaskReport> {
    let document = blocking(ctx, |ctx: &TaskContext| {
        let files = ctx.select(&ctx.registry.src.sprite_svg, &["*.svg"])?;
        if files.is_empty() {
            return Ok(None);
        }

        let mut symbols = Vec::with_capacity(files.len());
        for file in &files {
            let id = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .with_context(|| format!("icon without file name: {}", file.display()))?;
            let text = ctx.fs.read_to_string(file)?;
            let symbol = to_symbol(&id, &text)
                .with_context(|| format!("reading {}", ctx.registry.rel(file)))?;
            debug!(id = %id, "adding symbol");
            symbols.push(symbol);
        }
        Ok(Some((files.len(), sprite_document(&symbols))))
    })
    .await?;

    let Some((count, document)) = document else {
        debug!("no svg icons; nothing to compile");
        return Ok(TaskReport::default().with_note("no svg icons"));
    };

    let out = ctx.registry.src.svg_sprite_file();
    match &ctx.tools.svg_optimize {
        Some(optimize) => {
            // Staged outside the source tree so the watcher never sees it.
            let staged = tempfile::Builder::new()
                .prefix("frontpipe-sprite-")
                .suffix(".svg")
                .tempfile()
                .context("creating sprite staging file")?;
            std::fs::write(staged.path(), document.as_bytes())
                .with_context(|| format!("staging {}", staged.path().display()))?;
            let result = run_tool("svg_optimize", optimize, staged.path(), Some(&out)).await;
            if let Err(e) = staged.close() {
                warn!(error = %e, "removing staged sprite failed");
            }
            result?;
        }
        None => ctx.fs.write(&out, document.as_bytes())?,
    }

    Ok(TaskReport::written(1).with_note(format!("{count} symbols")))
}
