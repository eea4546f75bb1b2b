// src/task/sprite/scss.rs

//! `_sprites.scss` generation.
//!
//! Each sprite is described by a ten-element list:
//! `(x, y, offset-x, offset-y, width, height, total-width, total-height,
//! image, name)`. The mixins index into it with `nth`.

use std::fmt::Write as _;

use super::density::Density;
use super::pack::{Placement, SheetLayout};

/// Image path of the sheet at `scale`, as referenced from compiled CSS.
pub fn image_path(scale: u32) -> String {
    match scale {
        1 => "../assets/img/sprite/sprite.png".to_string(),
        n => format!("../assets/img/sprite/sprite@{n}x.png"),
    }
}

fn px(value: i64) -> String {
    format!("{value}px")
}

/// Variable name of a sprite at `scale` (`icon`, `icon-2x`, `icon-3x`).
fn var_name(name: &str, scale: u32) -> String {
    match scale {
        1 => name.to_string(),
        n => format!("{name}-{n}x"),
    }
}

fn write_sprite(out: &mut String, p: &Placement, layout: &SheetLayout, scale: u32) {
    let s = i64::from(scale);
    let var = var_name(&p.name, scale);
    let sprite_name = match scale {
        1 => p.name.clone(),
        n => format!("{}@{n}x", p.name),
    };
    let x = px(i64::from(p.x) * s);
    let y = px(i64::from(p.y) * s);
    let offset_x = px(-i64::from(p.x) * s);
    let offset_y = px(-i64::from(p.y) * s);
    let width = px(i64::from(p.width) * s);
    let height = px(i64::from(p.height) * s);
    let total_width = px(i64::from(layout.width) * s);
    let total_height = px(i64::from(layout.height) * s);
    let image = image_path(scale);

    let _ = writeln!(out, "${var}-name: '{sprite_name}';");
    let _ = writeln!(out, "${var}-x: {x};");
    let _ = writeln!(out, "${var}-y: {y};");
    let _ = writeln!(out, "${var}-offset-x: {offset_x};");
    let _ = writeln!(out, "${var}-offset-y: {offset_y};");
    let _ = writeln!(out, "${var}-width: {width};");
    let _ = writeln!(out, "${var}-height: {height};");
    let _ = writeln!(out, "${var}-total-width: {total_width};");
    let _ = writeln!(out, "${var}-total-height: {total_height};");
    let _ = writeln!(out, "${var}-image: '{image}';");
    let _ = writeln!(
        out,
        "${var}: ({x}, {y}, {offset_x}, {offset_y}, {width}, {height}, {total_width}, {total_height}, '{image}', '{sprite_name}', );"
    );
}

const BASE_MIXINS: &str = r#"
@mixin sprite-width($sprite) {
  width: nth($sprite, 5);
}

@mixin sprite-height($sprite) {
  height: nth($sprite, 6);
}

@mixin sprite-position($sprite) {
  $sprite-offset-x: nth($sprite, 3);
  $sprite-offset-y: nth($sprite, 4);
  background-position: $sprite-offset-x $sprite-offset-y;
}

@mixin sprite-image($sprite) {
  $sprite-image: nth($sprite, 9);
  background-image: url(#{$sprite-image});
}

@mixin sprite($sprite) {
  @include sprite-image($sprite);
  @include sprite-position($sprite);
  @include sprite-width($sprite);
  @include sprite-height($sprite);
}

@mixin sprites($sprites) {
  @each $sprite in $sprites {
    $sprite-name: nth($sprite, 10);
    .#{$sprite-name} {
      @include sprite($sprite);
    }
  }
}
"#;

const RETINA_MIXINS_HEAD: &str = r#"
@mixin sprite-background-size($sprite) {
  $sprite-total-width: nth($sprite, 7);
  $sprite-total-height: nth($sprite, 8);
  background-size: $sprite-total-width $sprite-total-height;
}

@mixin retina-sprite($retina-group) {
  $normal-sprite: nth($retina-group, 2);
  $retina-sprite: nth($retina-group, 3);
  @include sprite($normal-sprite);

  @media (-webkit-min-device-pixel-ratio: 2), (min-resolution: 192dpi) {
    @include sprite-image($retina-sprite);
    @include sprite-background-size($normal-sprite);
  }
"#;

const RETINA_3X_MEDIA: &str = r#"
  $retina-3x-sprite: nth($retina-group, 4);

  @media (-webkit-min-device-pixel-ratio: 3), (min-resolution: 288dpi) {
    @include sprite-image($retina-3x-sprite);
    @include sprite-background-size($normal-sprite);
  }
"#;

const RETINA_MIXINS_TAIL: &str = r#"}

@mixin retina-sprites($retina-groups) {
  @each $retina-group in $retina-groups {
    $sprite-name: nth($retina-group, 1);
    .#{$sprite-name} {
      @include retina-sprite($retina-group);
    }
  }
}
"#;

/// Render the mapping stylesheet for a packed sheet.
pub fn render(layout: &SheetLayout, density: Density) -> String {
    let scales = density.scales();
    let mut out = String::new();

    out.push_str("// Generated by frontpipe from assets/img/sprite/png. Do not edit.\n\n");

    for p in &layout.placements {
        for &scale in scales {
            write_sprite(&mut out, p, layout, scale);
        }
        if scales.len() > 1 {
            let members: Vec<String> = scales.iter().map(|&s| format!("${}", var_name(&p.name, s))).collect();
            let _ = writeln!(out, "${}-group-name: '{}';", p.name, p.name);
            let _ = writeln!(out, "${}-group: ('{}', {}, );", p.name, p.name, members.join(", "));
        }
        out.push('\n');
    }

    let sprites: Vec<String> = layout.placements.iter().map(|p| format!("${}", p.name)).collect();
    let _ = writeln!(out, "$spritesheet-width: {};", px(i64::from(layout.width)));
    let _ = writeln!(out, "$spritesheet-height: {};", px(i64::from(layout.height)));
    let _ = writeln!(out, "$spritesheet-image: '{}';", image_path(1));
    let _ = writeln!(out, "$spritesheet-sprites: ({}, );", sprites.join(", "));
    let _ = writeln!(
        out,
        "$spritesheet: ({}, {}, '{}', $spritesheet-sprites, );",
        px(i64::from(layout.width)),
        px(i64::from(layout.height)),
        image_path(1)
    );

    if scales.len() > 1 {
        let groups: Vec<String> = layout.placements.iter().map(|p| format!("${}-group", p.name)).collect();
        let _ = writeln!(out, "$retina-groups: ({}, );", groups.join(", "));
    }

    out.push_str(BASE_MIXINS);
    if scales.len() > 1 {
        out.push_str(RETINA_MIXINS_HEAD);
        if density == Density::Triple {
            out.push_str(RETINA_3X_MEDIA);
        }
        out.push_str(RETINA_MIXINS_TAIL);
    }

    out
}
