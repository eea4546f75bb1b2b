// src/task/sprite/mod.rs

//! Sprite tasks: `compile-png-sprite` and `compile-svg-sprite`.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, bail};
use image::{DynamicImage, ImageFormat, ImageOutputFormat, RgbaImage};
use tracing::{debug, warn};

use super::{TaskContext, TaskReport};
use crate::fs::FileSystem;

pub mod density;
pub mod pack;
pub mod scss;
pub mod svg;

use density::{DensityCounts, is_base_name};
use pack::{PackItem, SheetLayout};

/// File name of the sheet at `scale` (`sprite.png`, `sprite@2x.png`, ...).
pub fn sheet_file_name(scale: u32) -> String {
    match scale {
        1 => "sprite.png".to_string(),
        n => format!("sprite@{n}x.png"),
    }
}

/// Name of the stylesheet written next to the mixins.
pub const SPRITE_SCSS: &str = "_sprites.scss";

/// Names of the regular files in `dir`, sorted. A missing directory is empty.
fn file_names(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<String>> {
    if !fs.is_dir(dir) {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for path in fs.read_dir(dir)? {
        if !fs.is_file(&path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// `<stem>@<scale>x.png` among `names`, matched case-insensitively.
fn retina_partner<'a>(names: &'a [String], stem: &str, scale: u32) -> Option<&'a str> {
    let wanted = format!("{stem}@{scale}x.png");
    names
        .iter()
        .find(|n| n.eq_ignore_ascii_case(&wanted))
        .map(String::as_str)
}

fn decode_png(fs: &dyn FileSystem, path: &Path) -> Result<RgbaImage> {
    let bytes = fs.read(path)?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .with_context(|| format!("decoding {}", path.display()))?;
    Ok(image.to_rgba8())
}

fn encode_png(image: RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image).write_to(&mut buf, ImageOutputFormat::Png)?;
    Ok(buf.into_inner())
}

/// Draw every image of one density onto a sheet using the base layout
/// scaled by `scale`.
fn compose(layout: &SheetLayout, images: &[(String, RgbaImage)], scale: u32) -> RgbaImage {
    let mut sheet = RgbaImage::new(layout.width * scale, layout.height * scale);
    for placement in &layout.placements {
        if let Some((_, image)) = images.iter().find(|(name, _)| *name == placement.name) {
            image::imageops::replace(
                &mut sheet,
                image,
                i64::from(placement.x * scale),
                i64::from(placement.y * scale),
            );
        }
    }
    sheet
}

/// `compile-png-sprite`.
pub fn compile_png_sprite(ctx: &TaskContext) -> Result<TaskReport> {
    let src = &ctx.registry.src;
    let fs = ctx.fs.as_ref();
    let names = file_names(fs, &src.sprite_png)?;

    let counts = DensityCounts::from_names(names.iter().map(String::as_str));
    let density = counts.density();
    if counts.discards_retina() {
        warn!(
            base = counts.base,
            x2 = counts.x2,
            x3 = counts.x3,
            density = %density,
            "retina sprite counts do not match; extra densities ignored"
        );
    }

    let bases: Vec<&String> = names.iter().filter(|n| is_base_name(n)).collect();
    if bases.is_empty() {
        debug!("no sprite images; nothing to pack");
        return Ok(TaskReport::default().with_note("no sprite images"));
    }

    // One image list per scale, each keyed by the base sprite name.
    let scales = density.scales();
    let mut per_scale: Vec<Vec<(String, RgbaImage)>> = vec![Vec::new(); scales.len()];
    let mut items = Vec::with_capacity(bases.len());

    for base in &bases {
        let stem = &base[..base.len() - ".png".len()];
        let image = decode_png(fs, &src.sprite_png.join(base.as_str()))?;
        items.push(PackItem {
            name: stem.to_string(),
            width: image.width(),
            height: image.height(),
        });
        per_scale[0].push((stem.to_string(), image));

        for (idx, &scale) in scales.iter().enumerate().skip(1) {
            let Some(partner) = retina_partner(&names, stem, scale) else {
                bail!("sprite '{base}' has no @{scale}x counterpart");
            };
            let image = decode_png(fs, &src.sprite_png.join(partner))?;
            per_scale[idx].push((stem.to_string(), image));
        }
    }

    let layout = pack::pack(&items, ctx.sprite.padding);

    for (idx, &scale) in scales.iter().enumerate() {
        let sheet = compose(&layout, &per_scale[idx], scale);
        let out = src.sprite.join(sheet_file_name(scale));
        debug!(out = %ctx.registry.rel(&out), width = sheet.width(), height = sheet.height(), "writing sprite sheet");
        fs.write(&out, &encode_png(sheet)?)?;
    }

    let stylesheet = scss::render(&layout, density);
    fs.write(&src.styles_mixins.join(SPRITE_SCSS), stylesheet.as_bytes())?;

    Ok(TaskReport::written(scales.len() + 1).with_note(format!("{density} density")))
}
