// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::fs::FileSystem;
use crate::plan::BindingSpec;
use crate::types::{WatchEventKind, WatchEvents};

/// Compiled include/exclude globs.
///
/// Patterns are written relative to the project root with forward slashes.
/// A leading `!` turns a pattern into an exclusion, so a list reads like:
///
/// ```text
/// src/styles/**/*.scss
/// !src/styles/vendors/*
/// ```
///
/// `*` never crosses a `/`; `**` does.
#[derive(Clone)]
pub struct PatternSet {
    patterns: Vec<String>,
    include: GlobSet,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternSet")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        for pat in patterns {
            let pat = pat.as_ref();
            match pat.strip_prefix('!') {
                Some(neg) => exclude.push(neg.to_string()),
                None => include.push(pat.to_string()),
            }
        }

        let include_set = build_globset(&include).context("building include globset")?;
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(&exclude).context("building exclude globset")?)
        };

        Ok(Self {
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
            include: include_set,
            exclude: exclude_set,
        })
    }

    /// The patterns as written, exclusions included.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns true if `rel_path` (relative to project root) is selected.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Collect all files below `base` whose path relative to `root` is selected
/// by `set`.
///
/// `base` only bounds the directory walk; matching is always done on the
/// root-relative path. A missing `base` yields no files. The result is
/// sorted so every task processes its inputs in a stable order.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    base: &Path,
    set: &PatternSet,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !fs.is_dir(base) {
        return Ok(files);
    }

    let mut stack = vec![base.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if set.matches(&rel_str) {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Compiled watch binding: patterns plus accepted event kinds.
///
/// The sequence to re-run lives in the runtime core, keyed by `id`.
#[derive(Clone)]
pub struct WatchProfile {
    id: usize,
    label: String,
    patterns: PatternSet,
    events: WatchEvents,
}

impl fmt::Debug for WatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchProfile")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl WatchProfile {
    pub fn new(id: usize, label: impl Into<String>, patterns: PatternSet, events: WatchEvents) -> Self {
        Self {
            id,
            label: label.into(),
            patterns,
            events,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// True if an event of `kind` on `rel_path` should fire this binding.
    pub fn fires_on(&self, rel_path: &str, kind: WatchEventKind) -> bool {
        self.events.accepts(kind) && self.patterns.matches(rel_path)
    }
}

/// Compile binding specs into watch profiles; profile ids are list indices.
pub fn build_watch_profiles(bindings: &[BindingSpec]) -> Result<Vec<WatchProfile>> {
    bindings
        .iter()
        .enumerate()
        .map(|(id, b)| {
            let patterns = PatternSet::new(&b.patterns)
                .with_context(|| format!("compiling patterns of binding '{}'", b.label))?;
            Ok(WatchProfile::new(id, b.label.clone(), patterns, b.events))
        })
        .collect()
}
