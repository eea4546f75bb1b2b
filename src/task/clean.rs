// src/task/clean.rs

//! Clean tasks. Removing something that is already gone succeeds.

use anyhow::Result;
use tracing::debug;

use super::{TaskContext, TaskReport};
use crate::types::Target;

/// `clean-dev`, `clean-lib`, `clean-build`: remove a whole output root.
pub fn clean_tree(ctx: &TaskContext, target: Target) -> Result<TaskReport> {
    let root = ctx.registry.output_root(target);
    debug!(path = %root.display(), "removing output tree");
    ctx.fs.remove_all(root)?;
    Ok(TaskReport::default())
}

/// `clean-fonts`: remove `<dev>/fonts/`.
pub fn clean_fonts(ctx: &TaskContext) -> Result<TaskReport> {
    ctx.fs.remove_all(&ctx.registry.dev.fonts)?;
    Ok(TaskReport::default())
}

/// `clean-html`: remove the compiled pages at the root of `<dev>`.
pub fn clean_html(ctx: &TaskContext) -> Result<TaskReport> {
    for page in ctx.select(&ctx.registry.dev.pages, &["*.html"])? {
        debug!(path = %page.display(), "removing page");
        ctx.fs.remove_all(&page)?;
    }
    Ok(TaskReport::default())
}

/// `clean-assets`: remove `<dev>/assets/`.
pub fn clean_assets(ctx: &TaskContext) -> Result<TaskReport> {
    ctx.fs.remove_all(&ctx.registry.dev.assets)?;
    Ok(TaskReport::default())
}
