// src/task/html.rs

//! Page tasks: `compile-html`, `compile-html-lib`, `build-html`.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use super::include::{IncludeContext, IncludeExpander};
use super::{TaskContext, TaskReport};

/// Stylesheet reference that replaces a `build:css` block.
pub const BUILD_CSS_TAG: &str = r#"<link rel="stylesheet" href="styles/style.min.css">"#;
/// Script reference that replaces a `build:js` block.
pub const BUILD_JS_TAG: &str = r#"<script src="js/script.min.js" async></script>"#;

/// Script elements match whole so comment-like text inside them is skipped.
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<script\b[\s\S]*?</script\s*>|<!--([\s\S]*?)-->").expect("static regex")
});

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").expect("static regex"));

static BUILD_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([ \t]*)<!--\s*build:([\w-]+)[^>]*?-->[\s\S]*?<!--\s*endbuild\s*-->")
        .expect("static regex")
});

/// Remove HTML comments, keeping build markers, IE conditional comments and
/// `<!--* ... -->` comments. Script bodies are left alone.
pub fn strip_comments(html: &str) -> String {
    COMMENT_RE
        .replace_all(html, |caps: &Captures| {
            let Some(inner) = caps.get(1) else {
                return caps[0].to_string();
            };
            let inner = inner.as_str().trim();
            let kept = inner.starts_with("build:")
                || inner == "endbuild"
                || inner.starts_with('*')
                || inner.starts_with("[if")
                || inner.starts_with("<![endif]");
            if kept { caps[0].to_string() } else { String::new() }
        })
        .into_owned()
}

/// Collapse runs of blank (or whitespace-only) lines into one line break.
pub fn collapse_blank_lines(html: &str) -> String {
    BLANK_LINES_RE.replace_all(html, "\n").into_owned()
}

/// Replace `<!-- build:NAME -->...<!-- endbuild -->` blocks.
///
/// `css` and `js` blocks become a reference to the merged production file,
/// indented like the opening marker; blocks with any other name are removed.
pub fn rewrite_build_blocks(html: &str) -> String {
    BUILD_BLOCK_RE
        .replace_all(html, |caps: &Captures| {
            let indent = &caps[1];
            match &caps[2] {
                "css" => format!("{indent}{BUILD_CSS_TAG}"),
                "js" => format!("{indent}{BUILD_JS_TAG}"),
                _ => String::new(),
            }
        })
        .into_owned()
}

fn write_page(ctx: &TaskContext, out_dir: &Path, page: &Path, html: &str) -> Result<()> {
    let name = page
        .file_name()
        .with_context(|| format!("page without file name: {}", page.display()))?;
    let out = out_dir.join(name);
    debug!(page = %ctx.registry.rel(page), out = %ctx.registry.rel(&out), "writing page");
    ctx.fs.write(&out, html.as_bytes())
}

/// `compile-html`: `<src>/pages/*.html` to `<dev>/*.html`.
pub fn compile_html(ctx: &TaskContext) -> Result<TaskReport> {
    let src = &ctx.registry.src;
    let pages = ctx.select(&src.pages, &["*.html"])?;

    // Evaluated once per run, before any page is expanded.
    let sprite_exists = ctx.fs.exists(&src.svg_sprite_file());
    let mut context = IncludeContext::new();
    context.insert("svgSpriteExists".to_string(), Value::Bool(sprite_exists));

    let expander = IncludeExpander::new(ctx.fs.as_ref(), &src.root);
    for page in &pages {
        let html = expander
            .expand_path(page, &context)
            .with_context(|| format!("expanding {}", ctx.registry.rel(page)))?;
        let html = collapse_blank_lines(&strip_comments(&html));
        write_page(ctx, &ctx.registry.dev.pages, page, &html)?;
    }

    Ok(TaskReport::written(pages.len()))
}

/// `compile-html-lib`: `<src>/pages/library/*.html` to `<library>/*.html`.
pub fn compile_html_lib(ctx: &TaskContext) -> Result<TaskReport> {
    let src = &ctx.registry.src;
    let pages = ctx.select(&src.pages_library, &["*.html"])?;

    let expander = IncludeExpander::new(ctx.fs.as_ref(), &src.root);
    let context = IncludeContext::new();
    for page in &pages {
        let html = expander
            .expand_path(page, &context)
            .with_context(|| format!("expanding {}", ctx.registry.rel(page)))?;
        write_page(ctx, &ctx.registry.library.pages, page, &html)?;
    }

    Ok(TaskReport::written(pages.len()))
}

/// `build-html`: `<dev>/*.html` to `<build>/*.html` with merged bundle
/// references.
pub fn build_html(ctx: &TaskContext) -> Result<TaskReport> {
    let pages = ctx.select(&ctx.registry.dev.pages, &["*.html"])?;
    for page in &pages {
        let html = ctx.fs.read_to_string(page)?;
        write_page(ctx, &ctx.registry.build.pages, page, &rewrite_build_blocks(&html))?;
    }
    Ok(TaskReport::written(pages.len()))
}
