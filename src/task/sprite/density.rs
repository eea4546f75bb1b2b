// src/task/sprite/density.rs

//! Raster sprite density selection.
//!
//! The choice is made from file counts alone: one set of `@2x`/`@3x` files
//! per base image enables the corresponding retina sheet. Any mismatch
//! falls back to a lower density rather than failing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static BASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[^@]+\.png$").expect("static regex"));
static X2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)@2x\.png$").expect("static regex"));
static X3_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)@3x\.png$").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Density {
    Single,
    Double,
    Triple,
}

impl Density {
    /// Scale factors of the sheets emitted for this density.
    pub fn scales(self) -> &'static [u32] {
        match self {
            Density::Single => &[1],
            Density::Double => &[1, 2],
            Density::Triple => &[1, 2, 3],
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Density::Single => "single",
            Density::Double => "double",
            Density::Triple => "triple",
        })
    }
}

/// Number of base, `@2x` and `@3x` images in the sprite source directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DensityCounts {
    pub base: usize,
    pub x2: usize,
    pub x3: usize,
}

impl DensityCounts {
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts = Self::default();
        for name in names {
            if BASE_RE.is_match(name) {
                counts.base += 1;
            }
            if X2_RE.is_match(name) {
                counts.x2 += 1;
            }
            if X3_RE.is_match(name) {
                counts.x3 += 1;
            }
        }
        counts
    }

    pub fn density(&self) -> Density {
        if self.base == self.x2 && self.base == self.x3 {
            Density::Triple
        } else if self.base == self.x2 {
            Density::Double
        } else {
            Density::Single
        }
    }

    /// True when retina files exist that the chosen density ignores.
    pub fn discards_retina(&self) -> bool {
        match self.density() {
            Density::Triple => false,
            Density::Double => self.x3 > 0,
            Density::Single => self.x2 > 0 || self.x3 > 0,
        }
    }
}

/// A base (1x) sprite file name.
pub fn is_base_name(name: &str) -> bool {
    BASE_RE.is_match(name)
}
