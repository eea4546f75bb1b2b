// src/task/fonts.rs

use std::sync::Arc;

use anyhow::{Context, Result};

use super::{FontFormat, TaskContext, TaskReport};
use crate::exec::tool::run_tool;

/// `convert-fonts-<format>`: `<src>/fonts/*.ttf` to `<dev>/fonts/<stem>.<ext>`
/// through the configured converter.
pub async fn convert_fonts(ctx: &Arc<TaskContext>, format: FontFormat) -> Result<TaskReport> {
    let template = match format {
        FontFormat::Woff => &ctx.tools.woff,
        FontFormat::Woff2 => &ctx.tools.woff2,
        FontFormat::Eot => &ctx.tools.eot,
    };

    let fonts = ctx.select(&ctx.registry.src.fonts, &["*.ttf"])?;
    if fonts.is_empty() {
        return Ok(TaskReport::default());
    }

    let out_dir = &ctx.registry.dev.fonts;
    ctx.fs.create_dir_all(out_dir)?;

    for ttf in &fonts {
        let stem = ttf
            .file_stem()
            .with_context(|| format!("font without file name: {}", ttf.display()))?;
        let out = out_dir.join(format!("{}.{}", stem.to_string_lossy(), format.extension()));
        run_tool(format.extension(), template, ttf, Some(&out)).await?;
    }

    Ok(TaskReport::written(fonts.len()))
}
