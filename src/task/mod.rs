// src/task/mod.rs

//! Task primitives.
//!
//! A task is a stateless, named transformation: it selects source files by
//! glob through the [`PathRegistry`], applies its steps in a fixed order and
//! writes into one output directory. Tasks declare the artifacts they read,
//! write and clear so a composition can be checked before it runs (see
//! [`crate::plan::graph`]).

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{ConfigFile, CssSection, SpriteSection, ToolsSection};
use crate::fs::FileSystem;
use crate::registry::PathRegistry;
use crate::types::Target;
use crate::watch::patterns::{PatternSet, collect_matching_files};

pub mod assets;
pub mod clean;
pub mod css;
pub mod fonts;
pub mod html;
pub mod include;
pub mod js;
pub mod sprite;

/// One of the four stylesheet bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CssBundle {
    General,
    Vendors,
    UiKit,
    Components,
}

impl CssBundle {
    /// Concatenation order for the production stylesheet.
    pub const ALL: [CssBundle; 4] = [
        CssBundle::General,
        CssBundle::Vendors,
        CssBundle::UiKit,
        CssBundle::Components,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CssBundle::General => "general",
            CssBundle::Vendors => "vendors",
            CssBundle::UiKit => "ui-kit",
            CssBundle::Components => "components",
        }
    }

    /// File stem of the entry stylesheet and of the compiled output.
    pub fn file_stem(self) -> &'static str {
        match self {
            CssBundle::General => "style",
            other => other.name(),
        }
    }

    /// Third-party styles are never linted.
    pub fn linted(self) -> bool {
        self != CssBundle::Vendors
    }
}

/// One of the four script bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JsBundle {
    Vendors,
    Common,
    UiKit,
    Components,
}

impl JsBundle {
    /// Runtime evaluation order of the production script.
    pub const ALL: [JsBundle; 4] = [
        JsBundle::Vendors,
        JsBundle::Common,
        JsBundle::UiKit,
        JsBundle::Components,
    ];

    pub fn name(self) -> &'static str {
        match self {
            JsBundle::Vendors => "vendors",
            JsBundle::Common => "common",
            JsBundle::UiKit => "ui-kit",
            JsBundle::Components => "components",
        }
    }

    /// `common.js` is plain script; the others assemble parts with `@@include`.
    pub fn expands_includes(self) -> bool {
        self != JsBundle::Common
    }

    pub fn linted(self) -> bool {
        self != JsBundle::Vendors
    }
}

/// Font format produced by one conversion task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontFormat {
    Woff,
    Woff2,
    Eot,
}

impl FontFormat {
    pub const ALL: [FontFormat; 3] = [FontFormat::Woff, FontFormat::Woff2, FontFormat::Eot];

    pub fn extension(self) -> &'static str {
        match self {
            FontFormat::Woff => "woff",
            FontFormat::Woff2 => "woff2",
            FontFormat::Eot => "eot",
        }
    }
}

/// Identifier of a task primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskId {
    CleanDev,
    CleanLibrary,
    CleanBuild,
    CleanFonts,
    CleanHtml,
    CleanAssets,
    ConvertFonts(FontFormat),
    CompileSvgSprite,
    CompilePngSprite,
    CompileHtml,
    CompileHtmlLib,
    /// Development or library stylesheet bundle.
    CompileCss(CssBundle, Target),
    /// Development or library script bundle.
    CompileJs(JsBundle, Target),
    ExportAssets,
    BuildHtml,
    BuildCss,
    BuildJs,
    BuildFonts,
    ExportImages,
    ExportFiles,
}

/// Something a task reads or writes, at the granularity ordering is
/// checked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Artifact {
    /// `sprite.svg` in the source tree.
    SvgSprite,
    /// `sprite*.png` plus `_sprites.scss` in the source tree.
    PngSprite,
    Pages(Target),
    Styles(Target),
    Scripts(Target),
    Fonts(Target),
    Assets(Target),
}

impl Artifact {
    /// All artifacts living in an output tree.
    fn in_tree(target: Target) -> Vec<Artifact> {
        vec![
            Artifact::Pages(target),
            Artifact::Styles(target),
            Artifact::Scripts(target),
            Artifact::Fonts(target),
            Artifact::Assets(target),
        ]
    }
}

impl TaskId {
    /// Stable kebab-case name used in logs and plan output.
    pub fn name(&self) -> String {
        match self {
            TaskId::CleanDev => "clean-dev".into(),
            TaskId::CleanLibrary => "clean-lib".into(),
            TaskId::CleanBuild => "clean-build".into(),
            TaskId::CleanFonts => "clean-fonts".into(),
            TaskId::CleanHtml => "clean-html".into(),
            TaskId::CleanAssets => "clean-assets".into(),
            TaskId::ConvertFonts(f) => format!("convert-fonts-{}", f.extension()),
            TaskId::CompileSvgSprite => "compile-svg-sprite".into(),
            TaskId::CompilePngSprite => "compile-png-sprite".into(),
            TaskId::CompileHtml => "compile-html".into(),
            TaskId::CompileHtmlLib => "compile-html-lib".into(),
            TaskId::CompileCss(b, t) => format!("compile-css-{}{}", b.name(), t.task_suffix()),
            TaskId::CompileJs(b, t) => format!("compile-js-{}{}", b.name(), t.task_suffix()),
            TaskId::ExportAssets => "export-assets".into(),
            TaskId::BuildHtml => "build-html".into(),
            TaskId::BuildCss => "build-css".into(),
            TaskId::BuildJs => "build-js".into(),
            TaskId::BuildFonts => "build-fonts".into(),
            TaskId::ExportImages => "export-images".into(),
            TaskId::ExportFiles => "export-files".into(),
        }
    }

    /// Artifacts that must exist before this task runs.
    pub fn inputs(&self) -> Vec<Artifact> {
        use Artifact::*;
        match self {
            TaskId::CompileHtml => vec![SvgSprite],
            TaskId::CompileCss(bundle, _) if *bundle != CssBundle::Vendors => vec![PngSprite],
            TaskId::ExportAssets => vec![SvgSprite, PngSprite],
            TaskId::BuildHtml => vec![Pages(Target::Dev)],
            TaskId::BuildCss => vec![Styles(Target::Dev)],
            TaskId::BuildJs => vec![Scripts(Target::Dev)],
            TaskId::BuildFonts => vec![Fonts(Target::Dev)],
            TaskId::ExportImages | TaskId::ExportFiles => vec![Assets(Target::Dev)],
            _ => Vec::new(),
        }
    }

    /// Artifacts this task writes.
    pub fn outputs(&self) -> Vec<Artifact> {
        use Artifact::*;
        match self {
            TaskId::ConvertFonts(_) => vec![Fonts(Target::Dev)],
            TaskId::CompileSvgSprite => vec![SvgSprite],
            TaskId::CompilePngSprite => vec![PngSprite],
            TaskId::CompileHtml => vec![Pages(Target::Dev)],
            TaskId::CompileHtmlLib => vec![Pages(Target::Library)],
            TaskId::CompileCss(_, t) => vec![Styles(*t)],
            TaskId::CompileJs(_, t) => vec![Scripts(*t)],
            TaskId::ExportAssets => vec![Assets(Target::Dev)],
            TaskId::BuildHtml => vec![Pages(Target::Build)],
            TaskId::BuildCss => vec![Styles(Target::Build)],
            TaskId::BuildJs => vec![Scripts(Target::Build)],
            TaskId::BuildFonts => vec![Fonts(Target::Build)],
            TaskId::ExportImages | TaskId::ExportFiles => vec![Assets(Target::Build)],
            _ => Vec::new(),
        }
    }

    /// Artifacts this task deletes.
    pub fn clears(&self) -> Vec<Artifact> {
        match self {
            TaskId::CleanDev => Artifact::in_tree(Target::Dev),
            TaskId::CleanLibrary => Artifact::in_tree(Target::Library),
            TaskId::CleanBuild => Artifact::in_tree(Target::Build),
            TaskId::CleanFonts => vec![Artifact::Fonts(Target::Dev)],
            TaskId::CleanHtml => vec![Artifact::Pages(Target::Dev)],
            TaskId::CleanAssets => vec![Artifact::Assets(Target::Dev)],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Everything a task needs: resolved paths, tool templates and the
/// filesystem.
#[derive(Debug)]
pub struct TaskContext {
    pub registry: PathRegistry,
    pub tools: ToolsSection,
    pub sprite: SpriteSection,
    pub css: CssSection,
    pub fs: Arc<dyn FileSystem>,
}

impl TaskContext {
    pub fn new(registry: PathRegistry, config: &ConfigFile, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            registry,
            tools: config.tools.clone(),
            sprite: config.sprite.clone(),
            css: config.css.clone(),
            fs,
        }
    }

    /// Files below `dir` selected by `patterns`, relative to `dir`.
    ///
    /// Patterns are written relative to `dir` and may use `!` exclusions.
    pub fn select(&self, dir: &Path, patterns: &[&str]) -> Result<Vec<PathBuf>> {
        let prefix = self.registry.rel(dir);
        let anchored: Vec<String> = patterns
            .iter()
            .map(|p| match p.strip_prefix('!') {
                Some(neg) => format!("!{prefix}/{neg}"),
                None => format!("{prefix}/{p}"),
            })
            .collect();
        let set = PatternSet::new(&anchored)?;
        collect_matching_files(self.fs.as_ref(), self.registry.project_root(), dir, &set)
    }
}

/// Success summary of one task invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReport {
    pub files_written: usize,
    /// Extra detail worth a log line, e.g. the chosen sprite density.
    pub note: Option<String>,
}

impl TaskReport {
    pub fn written(files_written: usize) -> Self {
        Self {
            files_written,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Run a closure on the blocking pool with a shared context.
pub(crate) async fn blocking<T, F>(ctx: &Arc<TaskContext>, f: F) -> Result<T>
where
    F: FnOnce(&TaskContext) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let ctx = Arc::clone(ctx);
    tokio::task::spawn_blocking(move || f(&ctx))
        .await
        .context("blocking task panicked")?
}

/// Execute one task primitive.
pub async fn run_task(id: TaskId, ctx: Arc<TaskContext>) -> Result<TaskReport> {
    match id {
        TaskId::CleanDev => clean::clean_tree(&ctx, Target::Dev),
        TaskId::CleanLibrary => clean::clean_tree(&ctx, Target::Library),
        TaskId::CleanBuild => clean::clean_tree(&ctx, Target::Build),
        TaskId::CleanFonts => clean::clean_fonts(&ctx),
        TaskId::CleanHtml => clean::clean_html(&ctx),
        TaskId::CleanAssets => clean::clean_assets(&ctx),
        TaskId::ConvertFonts(format) => fonts::convert_fonts(&ctx, format).await,
        TaskId::CompileSvgSprite => sprite::svg::compile_svg_sprite(&ctx).await,
        TaskId::CompilePngSprite => blocking(&ctx, sprite::compile_png_sprite).await,
        TaskId::CompileHtml => blocking(&ctx, html::compile_html).await,
        TaskId::CompileHtmlLib => blocking(&ctx, html::compile_html_lib).await,
        TaskId::CompileCss(bundle, target) => css::compile_css(&ctx, bundle, target).await,
        TaskId::CompileJs(bundle, target) => js::compile_js(&ctx, bundle, target).await,
        TaskId::ExportAssets => assets::export_assets(&ctx),
        TaskId::BuildHtml => blocking(&ctx, html::build_html).await,
        TaskId::BuildCss => blocking(&ctx, css::build_css).await,
        TaskId::BuildJs => js::build_js(&ctx).await,
        TaskId::BuildFonts => assets::build_fonts(&ctx),
        TaskId::ExportImages => assets::export_images(&ctx).await,
        TaskId::ExportFiles => assets::export_files(&ctx),
    }
}
