#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use frontpipe::config::{ConfigFile, RawConfigFile};
use frontpipe::fs::RealFileSystem;
use frontpipe::registry::PathRegistry;
use frontpipe::task::TaskContext;
use frontpipe::types::Strategy;
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults; the tunnel and report are disabled so
/// nothing reaches the network unless a test opts in.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.tunnel.enabled = false;
        config.report.enabled = false;
        Self { config }
    }

    pub fn with_roots(mut self, src: &str, dev: &str, build: &str, library: &str) -> Self {
        self.config.paths.src = src.to_string();
        self.config.paths.dev = dev.to_string();
        self.config.paths.build = build.to_string();
        self.config.paths.library = library.to_string();
        self
    }

    pub fn with_ports(mut self, dev: u16, build: u16) -> Self {
        self.config.server.dev_port = dev;
        self.config.server.build_port = build;
        self
    }

    pub fn with_sprite_padding(mut self, padding: u32) -> Self {
        self.config.sprite.padding = padding;
        self
    }

    /// Point every font converter at a plain `cp`, so font tasks run without
    /// the real tools installed.
    pub fn with_copying_font_tools(mut self) -> Self {
        self.config.tools.woff = "cp {input} {output}".to_string();
        self.config.tools.woff2 = "cp {input} {output}".to_string();
        self.config.tools.eot = "cp {input} {output}".to_string();
        self
    }

    pub fn with_js_lint(mut self, template: &str) -> Self {
        self.config.tools.js_lint = Some(template.to_string());
        self
    }

    pub fn with_js_transpile(mut self, template: &str) -> Self {
        self.config.tools.js_transpile = Some(template.to_string());
        self
    }

    pub fn with_svg_optimize(mut self, template: &str) -> Self {
        self.config.tools.svg_optimize = Some(template.to_string());
        self
    }

    pub fn with_tunnel(mut self, cmd: &str, url_pattern: &str, startup_timeout: &str) -> Self {
        self.config.tunnel.enabled = true;
        self.config.tunnel.cmd = cmd.to_string();
        self.config.tunnel.url_pattern = url_pattern.to_string();
        self.config.tunnel.startup_timeout = startup_timeout.to_string();
        self
    }

    pub fn with_report(mut self, strategies: &[Strategy], delay: &str) -> Self {
        self.config.report.enabled = true;
        self.config.report.strategies = strategies.to_vec();
        self.config.report.delay = delay.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A throwaway project directory with helpers to lay out sources and read
/// back outputs. Paths are relative to the project root.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp project dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dir");
        }
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Write a solid-colour PNG of the given size.
    pub fn write_png(&self, rel: &str, width: u32, height: u32, rgba: [u8; 4]) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dir");
        }
        RgbaImage::from_pixel(width, height, Rgba(rgba))
            .save(&path)
            .expect("write fixture png");
        path
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).expect("create fixture dir");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel))
            .unwrap_or_else(|e| panic!("reading {rel}: {e}"))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Sorted file names directly inside `rel`.
    pub fn list(&self, rel: &str) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.path(rel)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn registry(&self, cfg: &ConfigFile) -> PathRegistry {
        PathRegistry::new(self.root(), &cfg.paths)
    }

    /// Task context on the real filesystem, rooted at this fixture.
    pub fn context(&self, cfg: &ConfigFile) -> Arc<TaskContext> {
        Arc::new(TaskContext::new(
            self.registry(cfg),
            cfg,
            Arc::new(RealFileSystem),
        ))
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
