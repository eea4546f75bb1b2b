// src/registry.rs

//! Path registry: logical asset categories mapped to directories.
//!
//! Every task resolves its input globs and output directory through this
//! registry. Only the four roots come from `[paths]`; the layout below each
//! root is fixed here, so renaming a root never touches task code.

use std::path::{Path, PathBuf};

use crate::config::PathsSection;
use crate::types::Target;

/// Source tree layout.
#[derive(Debug, Clone)]
pub struct SourcePaths {
    pub root: PathBuf,
    pub assets: PathBuf,
    pub img: PathBuf,
    pub sprite: PathBuf,
    pub sprite_svg: PathBuf,
    pub sprite_png: PathBuf,
    pub components: PathBuf,
    pub components_features: PathBuf,
    pub components_shared: PathBuf,
    pub fonts: PathBuf,
    pub js: PathBuf,
    pub js_vendors: PathBuf,
    pub js_ui_kit: PathBuf,
    pub pages: PathBuf,
    pub pages_include: PathBuf,
    pub pages_library: PathBuf,
    pub styles: PathBuf,
    pub styles_common: PathBuf,
    pub styles_dependencies: PathBuf,
    pub styles_mixins: PathBuf,
    pub styles_vendors: PathBuf,
    pub styles_ui_kit: PathBuf,
}

impl SourcePaths {
    fn new(root: PathBuf) -> Self {
        let assets = root.join("assets");
        let img = assets.join("img");
        let sprite = img.join("sprite");
        let components = root.join("components");
        let js = root.join("js");
        let pages = root.join("pages");
        let styles = root.join("styles");
        let styles_dependencies = styles.join("dependencies");

        Self {
            sprite_svg: sprite.join("svg"),
            sprite_png: sprite.join("png"),
            components_features: components.join("features"),
            components_shared: components.join("shared"),
            fonts: root.join("fonts"),
            js_vendors: js.join("vendors"),
            js_ui_kit: js.join("ui-kit"),
            pages_include: pages.join("include"),
            pages_library: pages.join("library"),
            styles_common: styles.join("common"),
            styles_mixins: styles_dependencies.join("mixins"),
            styles_vendors: styles.join("vendors"),
            styles_ui_kit: styles.join("ui-kit"),
            styles_dependencies,
            root,
            assets,
            img,
            sprite,
            components,
            js,
            pages,
            styles,
        }
    }

    /// The generated vector sprite; its presence toggles `svgSpriteExists`.
    pub fn svg_sprite_file(&self) -> PathBuf {
        self.sprite.join("sprite.svg")
    }
}

/// Layout shared by the development and production trees.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub root: PathBuf,
    pub assets: PathBuf,
    pub img: PathBuf,
    pub fonts: PathBuf,
    pub js: PathBuf,
    /// Pages live directly in the root.
    pub pages: PathBuf,
    pub styles: PathBuf,
}

impl OutputPaths {
    fn new(root: PathBuf) -> Self {
        let assets = root.join("assets");
        Self {
            img: assets.join("img"),
            fonts: root.join("fonts"),
            js: root.join("js"),
            pages: root.clone(),
            styles: root.join("styles"),
            assets,
            root,
        }
    }
}

/// Layout of the component library tree.
#[derive(Debug, Clone)]
pub struct LibraryPaths {
    pub root: PathBuf,
    pub pages: PathBuf,
    pub js: PathBuf,
    pub styles: PathBuf,
}

impl LibraryPaths {
    fn new(root: PathBuf) -> Self {
        Self {
            pages: root.clone(),
            js: root.join("js"),
            styles: root.join("styles"),
            root,
        }
    }
}

/// All paths used by the pipelines, resolved against one project root.
#[derive(Debug, Clone)]
pub struct PathRegistry {
    project_root: PathBuf,
    pub src: SourcePaths,
    pub dev: OutputPaths,
    pub build: OutputPaths,
    pub library: LibraryPaths,
}

impl PathRegistry {
    pub fn new(project_root: impl Into<PathBuf>, roots: &PathsSection) -> Self {
        let project_root = project_root.into();
        Self {
            src: SourcePaths::new(project_root.join(&roots.src)),
            dev: OutputPaths::new(project_root.join(&roots.dev)),
            build: OutputPaths::new(project_root.join(&roots.build)),
            library: LibraryPaths::new(project_root.join(&roots.library)),
            project_root,
        }
    }

    /// Directory every relative path and glob is evaluated against.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Root directory of the given output tree.
    pub fn output_root(&self, target: Target) -> &Path {
        match target {
            Target::Dev => &self.dev.root,
            Target::Library => &self.library.root,
            Target::Build => &self.build.root,
        }
    }

    /// Stylesheet output directory for a development-style target.
    pub fn styles_dir(&self, target: Target) -> &Path {
        match target {
            Target::Dev => &self.dev.styles,
            Target::Library => &self.library.styles,
            Target::Build => &self.build.styles,
        }
    }

    /// Script output directory for a development-style target.
    pub fn js_dir(&self, target: Target) -> &Path {
        match target {
            Target::Dev => &self.dev.js,
            Target::Library => &self.library.js,
            Target::Build => &self.build.js,
        }
    }

    /// `path` relative to the project root, with forward slashes.
    ///
    /// Globs in watch bindings and task selectors are written against these
    /// strings.
    pub fn rel(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.project_root).unwrap_or(path);
        rel.to_string_lossy().replace('\\', "/")
    }
}
