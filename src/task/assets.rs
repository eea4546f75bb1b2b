// src/task/assets.rs

//! Copy-through tasks for static assets and fonts.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use super::{TaskContext, TaskReport};
use crate::exec::tool::run_tool;

/// Copy every selected file below `from` to the same relative path below `to`.
fn mirror(ctx: &TaskContext, from: &Path, to: &Path, patterns: &[&str]) -> Result<TaskReport> {
    let files = ctx.select(from, patterns)?;
    for file in &files {
        let rel = file.strip_prefix(from)?;
        let out = to.join(rel);
        debug!(from = %ctx.registry.rel(file), to = %ctx.registry.rel(&out), "copying");
        ctx.fs.copy(file, &out)?;
    }
    Ok(TaskReport::written(files.len()))
}

/// `export-assets`: `<src>/assets/` minus the sprite sources into `<dev>/assets/`.
pub fn export_assets(ctx: &TaskContext) -> Result<TaskReport> {
    let reg = &ctx.registry;
    mirror(
        ctx,
        &reg.src.assets,
        &reg.dev.assets,
        &["**/*.*", "!img/sprite/png/**", "!img/sprite/svg/**"],
    )
}

/// `build-fonts`: `<dev>/fonts/*.*` into `<build>/fonts/`.
pub fn build_fonts(ctx: &TaskContext) -> Result<TaskReport> {
    mirror(ctx, &ctx.registry.dev.fonts, &ctx.registry.build.fonts, &["*.*"])
}

/// `export-files`: everything in `<dev>/assets/` except images.
pub fn export_files(ctx: &TaskContext) -> Result<TaskReport> {
    let reg = &ctx.registry;
    mirror(ctx, &reg.dev.assets, &reg.build.assets, &["**/*", "!img/**"])
}

/// `export-images`: `<dev>/assets/img/` into `<build>/assets/img/`, through
/// the optional optimiser.
pub async fn export_images(ctx: &Arc<TaskContext>) -> Result<TaskReport> {
    let Some(optimize) = &ctx.tools.image_optimize else {
        return mirror(ctx, &ctx.registry.dev.img, &ctx.registry.build.img, &["**/*.{png,jpg,svg}"]);
    };

    let from = &ctx.registry.dev.img;
    let to = &ctx.registry.build.img;
    let images = ctx.select(from, &["**/*.{png,jpg,svg}"])?;
    for image in &images {
        let out = to.join(image.strip_prefix(from)?);
        if let Some(parent) = out.parent() {
            ctx.fs.create_dir_all(parent)?;
        }
        run_tool("image_optimize", optimize, image, Some(&out)).await?;
    }
    Ok(TaskReport::written(images.len()))
}
