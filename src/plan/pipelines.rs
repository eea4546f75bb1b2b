// src/plan/pipelines.rs

//! The three pipelines and their watch bindings.

use std::fmt::Write as _;

use super::{Step, parallel, series, validate_step};
use crate::cli::PipelineName;
use crate::config::ConfigFile;
use crate::errors::{PipelineError, Result};
use crate::exec::FailurePolicy;
use crate::registry::PathRegistry;
use crate::task::{CssBundle, FontFormat, JsBundle, TaskId};
use crate::types::{Target, WatchEvents};

/// A watch binding before compilation: globs relative to the project root,
/// accepted event kinds and the step to re-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSpec {
    pub label: String,
    /// Include globs; `!`-prefixed entries exclude.
    pub patterns: Vec<String>,
    pub events: WatchEvents,
    pub step: Step,
}

/// What the server stage serves after the plan completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerStage {
    pub target: Target,
    pub port: u16,
    /// Whether this pipeline opens a public tunnel to the server.
    pub tunnel: bool,
}

/// A named plan plus the long-running stages started after it.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub name: PipelineName,
    pub plan: Step,
    pub policy: FailurePolicy,
    pub server: ServerStage,
    pub report: bool,
    pub bindings: Vec<BindingSpec>,
}

fn font_generation() -> Step {
    series([
        Step::Task(TaskId::CleanFonts),
        parallel(FontFormat::ALL.map(TaskId::ConvertFonts)),
    ])
}

fn css(bundle: CssBundle, target: Target) -> Step {
    Step::Task(TaskId::CompileCss(bundle, target))
}

fn js(bundle: JsBundle, target: Target) -> Step {
    Step::Task(TaskId::CompileJs(bundle, target))
}

/// Glob builder anchored at one registry directory.
struct Globs<'a> {
    registry: &'a PathRegistry,
}

impl Globs<'_> {
    fn at(&self, dir: &std::path::Path, pattern: &str) -> String {
        format!("{}/{}", self.registry.rel(dir), pattern)
    }

    fn not(&self, dir: &std::path::Path, pattern: &str) -> String {
        format!("!{}", self.at(dir, pattern))
    }
}

fn binding(label: &str, patterns: Vec<String>, events: WatchEvents, step: Step) -> BindingSpec {
    BindingSpec {
        label: label.to_string(),
        patterns,
        events,
        step,
    }
}

fn scoped(scope: String, err: PipelineError) -> PipelineError {
    match err {
        PipelineError::PlanOrder(msg) => PipelineError::PlanOrder(format!("{scope}: {msg}")),
        other => other,
    }
}

impl Pipeline {
    /// Build the pipeline for `name` with paths and ports from the config.
    pub fn for_name(name: PipelineName, registry: &PathRegistry, config: &ConfigFile) -> Self {
        match name {
            PipelineName::Serve => Self::serve(registry, config),
            PipelineName::Lib => Self::lib(registry, config),
            PipelineName::Build => Self::build(config),
        }
    }

    fn serve(registry: &PathRegistry, config: &ConfigFile) -> Self {
        use CssBundle as C;
        use JsBundle as J;
        let dev = Target::Dev;

        let plan = series([
            Step::Task(TaskId::CleanDev),
            font_generation(),
            Step::Task(TaskId::CompileSvgSprite),
            Step::Task(TaskId::CompilePngSprite),
            Step::Task(TaskId::CompileHtml),
            css(C::General, dev),
            css(C::Vendors, dev),
            css(C::UiKit, dev),
            css(C::Components, dev),
            js(J::Common, dev),
            js(J::Vendors, dev),
            js(J::UiKit, dev),
            js(J::Components, dev),
            Step::Task(TaskId::ExportAssets),
        ]);

        let src = &registry.src;
        let g = Globs { registry };
        let html = || series([TaskId::CleanHtml, TaskId::CompileHtml]);
        let all = WatchEvents::All;
        let change = WatchEvents::ChangeOnly;

        let bindings = vec![
            binding("pages", vec![g.at(&src.pages, "*.html")], all, html()),
            binding(
                "page-parts",
                vec![g.at(&src.pages_include, "*.html"), g.at(&src.components, "**/*.html")],
                change,
                html(),
            ),
            binding(
                "svg-sprite-file",
                vec![g.at(&src.sprite, "sprite.svg")],
                all,
                html(),
            ),
            binding(
                "css-general",
                vec![
                    g.at(&src.styles, "**/*.scss"),
                    g.not(&src.styles_dependencies, "**"),
                    g.not(&src.styles_vendors, "*"),
                    g.not(&src.styles_ui_kit, "*"),
                    g.not(&src.styles, "vendors.scss"),
                    g.not(&src.styles, "components.scss"),
                    g.not(&src.styles, "ui-kit.scss"),
                ],
                change,
                css(C::General, dev),
            ),
            binding(
                "css-vendors",
                vec![g.at(&src.styles_vendors, "*"), g.at(&src.styles, "vendors.scss")],
                change,
                css(C::Vendors, dev),
            ),
            binding(
                "css-components",
                vec![g.at(&src.styles, "components.scss"), g.at(&src.components, "**/*.scss")],
                change,
                css(C::Components, dev),
            ),
            binding(
                "css-ui-kit",
                vec![g.at(&src.styles_ui_kit, "*"), g.at(&src.styles, "ui-kit.scss")],
                change,
                css(C::UiKit, dev),
            ),
            binding(
                "css-dependencies",
                vec![g.at(&src.styles_dependencies, "**/*.scss")],
                change,
                series([css(C::General, dev), css(C::UiKit, dev), css(C::Components, dev)]),
            ),
            binding(
                "js-vendors",
                vec![g.at(&src.js, "vendors.js"), g.at(&src.js_vendors, "*.js")],
                change,
                js(J::Vendors, dev),
            ),
            binding(
                "js-components",
                vec![g.at(&src.js, "components.js"), g.at(&src.components, "**/*.js")],
                change,
                js(J::Components, dev),
            ),
            binding(
                "js-ui-kit",
                vec![g.at(&src.js, "ui-kit.js"), g.at(&src.js_ui_kit, "**/*.js")],
                change,
                js(J::UiKit, dev),
            ),
            binding(
                "js-common",
                vec![g.at(&src.js, "common.js")],
                change,
                js(J::Common, dev),
            ),
            binding(
                "svg-sprite",
                vec![g.at(&src.sprite_svg, "*.svg")],
                all,
                Step::Task(TaskId::CompileSvgSprite),
            ),
            binding(
                "png-sprite",
                vec![g.at(&src.sprite_png, "**")],
                all,
                Step::Task(TaskId::CompilePngSprite),
            ),
            binding(
                "assets",
                vec![
                    g.at(&src.assets, "**/*.*"),
                    g.not(&src.sprite_png, "**"),
                    g.not(&src.sprite_svg, "**"),
                ],
                all,
                series([TaskId::CleanAssets, TaskId::ExportAssets]),
            ),
            binding("fonts", vec![g.at(&src.fonts, "*.ttf")], all, font_generation()),
        ];

        Self {
            name: PipelineName::Serve,
            plan,
            policy: FailurePolicy::Isolate,
            server: ServerStage {
                target: Target::Dev,
                port: config.server.dev_port,
                tunnel: true,
            },
            report: false,
            bindings,
        }
    }

    fn lib(registry: &PathRegistry, config: &ConfigFile) -> Self {
        use CssBundle as C;
        use JsBundle as J;
        let lib = Target::Library;

        let plan = series([
            Step::Task(TaskId::CleanLibrary),
            Step::Task(TaskId::CompileHtmlLib),
            css(C::General, lib),
            css(C::Vendors, lib),
            css(C::UiKit, lib),
            css(C::Components, lib),
            js(J::Common, lib),
            js(J::Vendors, lib),
            js(J::Components, lib),
            js(J::UiKit, lib),
        ]);

        let src = &registry.src;
        let g = Globs { registry };
        let change = WatchEvents::ChangeOnly;

        let bindings = vec![
            binding(
                "html-lib",
                vec![g.at(&src.pages_library, "*.html"), g.at(&src.components, "**/*.html")],
                change,
                Step::Task(TaskId::CompileHtmlLib),
            ),
            binding(
                "css-lib",
                vec![g.at(&src.styles, "**/*.scss"), g.at(&src.components, "**/*.scss")],
                change,
                parallel(CssBundle::ALL.map(|b| css(b, lib))),
            ),
            binding(
                "js-lib",
                vec![g.at(&src.js, "**/*.js"), g.at(&src.components, "**/*.js")],
                change,
                parallel([J::Vendors, J::Components, J::UiKit, J::Common].map(|b| js(b, lib))),
            ),
        ];

        Self {
            name: PipelineName::Lib,
            plan,
            policy: FailurePolicy::Isolate,
            server: ServerStage {
                target: Target::Library,
                port: config.server.dev_port,
                tunnel: false,
            },
            report: false,
            bindings,
        }
    }

    fn build(config: &ConfigFile) -> Self {
        let plan = series([
            TaskId::CleanBuild,
            TaskId::BuildHtml,
            TaskId::BuildCss,
            TaskId::BuildJs,
            TaskId::BuildFonts,
            TaskId::ExportImages,
            TaskId::ExportFiles,
        ]);

        Self {
            name: PipelineName::Build,
            plan,
            policy: FailurePolicy::Abort,
            server: ServerStage {
                target: Target::Build,
                port: config.server.build_port,
                tunnel: true,
            },
            report: true,
            bindings: Vec::new(),
        }
    }

    /// Validate the plan and every binding's step.
    pub fn validate(&self) -> Result<()> {
        validate_step(&self.plan).map_err(|e| scoped(format!("{} plan", self.name), e))?;
        for b in &self.bindings {
            validate_step(&b.step).map_err(|e| scoped(format!("binding '{}'", b.label), e))?;
        }
        Ok(())
    }

    /// Human-readable description of the plan and bindings for `--dry-run`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "pipeline: {}", self.name);
        out.push_str(&self.plan.render());
        let _ = writeln!(
            out,
            "server: {:?} tree on port {}{}",
            self.server.target,
            self.server.port,
            if self.server.tunnel { " (tunnel)" } else { "" }
        );
        if self.report {
            let _ = writeln!(out, "report: pagespeed");
        }
        for b in &self.bindings {
            let events = match b.events {
                WatchEvents::All => "all",
                WatchEvents::ChangeOnly => "change",
            };
            let _ = writeln!(out, "watch {} [{}] {}", b.label, events, b.patterns.join(" "));
            for line in b.step.render().lines() {
                let _ = writeln!(out, "  {line}");
            }
        }
        out
    }
}
