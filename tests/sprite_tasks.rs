// tests/sprite_tasks.rs

use std::error::Error;

use proptest::prelude::*;

use frontpipe::task::sprite::density::{Density, DensityCounts};
use frontpipe::task::sprite::pack::{PackItem, pack};
use frontpipe::task::sprite::svg::{sprite_document, to_symbol};
use frontpipe::task::{TaskId, run_task};
use frontpipe_test_utils::{ConfigFileBuilder, ProjectFixture, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

fn names(base: usize, x2: usize, x3: usize) -> Vec<String> {
    let mut out = Vec::new();
    for i in 0..base {
        out.push(format!("icon-{i}.png"));
    }
    for i in 0..x2 {
        out.push(format!("icon-{i}@2x.png"));
    }
    for i in 0..x3 {
        out.push(format!("icon-{i}@3x.png"));
    }
    out
}

fn counts(base: usize, x2: usize, x3: usize) -> DensityCounts {
    let names = names(base, x2, x3);
    DensityCounts::from_names(names.iter().map(String::as_str))
}

#[test]
fn full_retina_sets_pick_triple_density() {
    let c = counts(3, 3, 3);
    assert_eq!(c, DensityCounts { base: 3, x2: 3, x3: 3 });
    assert_eq!(c.density(), Density::Triple);
    assert!(!c.discards_retina());
}

#[test]
fn missing_3x_set_picks_double_density() {
    let c = counts(3, 3, 0);
    assert_eq!(c.density(), Density::Double);
    assert_eq!(c.density().scales(), &[1, 2]);
    assert!(!c.discards_retina());
}

#[test]
fn incomplete_2x_set_falls_back_to_single_density() {
    let c = counts(3, 2, 0);
    assert_eq!(c.density(), Density::Single);
    assert_eq!(c.density().scales(), &[1]);
    assert!(c.discards_retina());
}

#[test]
fn density_counting_ignores_case_and_other_files() {
    let c = DensityCounts::from_names(["a.PNG", "a@2X.png", "notes.txt", "b.jpg"]);
    assert_eq!(c, DensityCounts { base: 1, x2: 1, x3: 0 });
}

proptest! {
    #[test]
    fn density_follows_count_equalities(base in 0usize..6, x2 in 0usize..6, x3 in 0usize..6) {
        let c = counts(base, x2, x3);
        let expected = if base == x2 && base == x3 {
            Density::Triple
        } else if base == x2 {
            Density::Double
        } else {
            Density::Single
        };
        prop_assert_eq!(c.density(), expected);
    }

    #[test]
    fn packed_images_never_overlap(sizes in proptest::collection::vec((1u32..40, 1u32..40), 1..12)) {
        let items: Vec<PackItem> = sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| PackItem { name: format!("s{i:02}"), width: w, height: h })
            .collect();
        let layout = pack(&items, 2);

        prop_assert_eq!(layout.placements.len(), items.len());
        for p in &layout.placements {
            prop_assert!(p.x + p.width <= layout.width);
            prop_assert!(p.y + p.height <= layout.height);
        }
        for (i, a) in layout.placements.iter().enumerate() {
            for b in layout.placements.iter().skip(i + 1) {
                let apart = a.x + a.width <= b.x
                    || b.x + b.width <= a.x
                    || a.y + a.height <= b.y
                    || b.y + b.height <= a.y;
                prop_assert!(apart, "{:?} overlaps {:?}", a, b);
            }
        }
    }
}

#[test]
fn packing_is_deterministic_and_sorted_by_name() {
    let items = vec![
        PackItem { name: "zeta".into(), width: 10, height: 10 },
        PackItem { name: "alpha".into(), width: 20, height: 5 },
        PackItem { name: "mid".into(), width: 8, height: 30 },
    ];
    let first = pack(&items, 4);
    let mut reversed = items.clone();
    reversed.reverse();
    let second = pack(&reversed, 4);

    assert_eq!(first, second);
    let order: Vec<&str> = first.placements.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(order, vec!["alpha", "mid", "zeta"]);
}

#[tokio::test]
async fn png_sprite_writes_sheets_for_chosen_density() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    project.write_png("src/assets/img/sprite/png/big.png", 16, 16, [255, 0, 0, 255]);
    project.write_png("src/assets/img/sprite/png/big@2x.png", 32, 32, [255, 0, 0, 255]);
    project.write_png("src/assets/img/sprite/png/small.png", 8, 8, [0, 0, 255, 255]);
    project.write_png("src/assets/img/sprite/png/small@2x.png", 16, 16, [0, 0, 255, 255]);

    let cfg = ConfigFileBuilder::new().build();
    let report = run_task(TaskId::CompilePngSprite, project.context(&cfg)).await?;
    assert_eq!(report.note.as_deref(), Some("double density"));

    assert!(project.exists("src/assets/img/sprite/sprite.png"));
    assert!(project.exists("src/assets/img/sprite/sprite@2x.png"));
    assert!(!project.exists("src/assets/img/sprite/sprite@3x.png"));

    let base = image::open(project.path("src/assets/img/sprite/sprite.png"))?;
    let retina = image::open(project.path("src/assets/img/sprite/sprite@2x.png"))?;
    assert_eq!(retina.width(), base.width() * 2);
    assert_eq!(retina.height(), base.height() * 2);

    let scss = project.read("src/styles/dependencies/mixins/_sprites.scss");
    assert!(scss.contains("$big-name: 'big';"));
    assert!(scss.contains("$small-2x-name: 'small@2x';"));
    assert!(scss.contains("$retina-groups: ($big-group, $small-group, );"));
    assert!(scss.contains("@mixin retina-sprite($retina-group)"));
    assert!(!scss.contains("min-resolution: 288dpi"));
    Ok(())
}

#[tokio::test]
async fn incomplete_retina_set_writes_a_single_sheet() -> TestResult {
    let project = ProjectFixture::new();
    let dir = "src/assets/img/sprite/png";
    for (name, size) in [("a", 8), ("b", 10), ("c", 12)] {
        project.write_png(&format!("{dir}/{name}.png"), size, size, [0, 128, 0, 255]);
    }
    project.write_png(&format!("{dir}/a@2x.png"), 16, 16, [0, 128, 0, 255]);
    project.write_png(&format!("{dir}/b@2x.png"), 20, 20, [0, 128, 0, 255]);

    let cfg = ConfigFileBuilder::new().build();
    let report = run_task(TaskId::CompilePngSprite, project.context(&cfg)).await?;

    assert_eq!(report.note.as_deref(), Some("single density"));
    assert_eq!(report.files_written, 2);
    assert!(project.exists("src/assets/img/sprite/sprite.png"));
    assert!(!project.exists("src/assets/img/sprite/sprite@2x.png"));

    let scss = project.read("src/styles/dependencies/mixins/_sprites.scss");
    assert!(scss.contains("$spritesheet-sprites: ($a, $b, $c, );"));
    assert!(!scss.contains("$a-2x"));
    assert!(!scss.contains("$retina-groups"));
    assert!(!scss.contains("@mixin retina-sprite"));
    Ok(())
}

#[tokio::test]
async fn full_retina_set_writes_three_sheets() -> TestResult {
    let project = ProjectFixture::new();
    let dir = "src/assets/img/sprite/png";
    for name in ["a", "b", "c"] {
        project.write_png(&format!("{dir}/{name}.png"), 10, 10, [200, 0, 0, 255]);
        project.write_png(&format!("{dir}/{name}@2x.png"), 20, 20, [200, 0, 0, 255]);
        project.write_png(&format!("{dir}/{name}@3x.png"), 30, 30, [200, 0, 0, 255]);
    }

    let cfg = ConfigFileBuilder::new().build();
    let report = run_task(TaskId::CompilePngSprite, project.context(&cfg)).await?;

    assert_eq!(report.note.as_deref(), Some("triple density"));
    assert_eq!(report.files_written, 4);
    let base = image::open(project.path("src/assets/img/sprite/sprite.png"))?;
    let triple = image::open(project.path("src/assets/img/sprite/sprite@3x.png"))?;
    assert!(project.exists("src/assets/img/sprite/sprite@2x.png"));
    assert_eq!(triple.width(), base.width() * 3);

    let scss = project.read("src/styles/dependencies/mixins/_sprites.scss");
    assert!(scss.contains("$c-group: ('c', $c, $c-2x, $c-3x, );"));
    assert!(scss.contains("$c-3x-image: '../assets/img/sprite/sprite@3x.png';"));
    assert!(scss.contains("(min-resolution: 192dpi)"));
    assert!(scss.contains("(min-resolution: 288dpi)"));
    Ok(())
}

#[tokio::test]
async fn png_sprite_without_images_is_a_no_op() -> TestResult {
    let project = ProjectFixture::new();
    project.mkdir("src/assets/img/sprite/png");

    let cfg = ConfigFileBuilder::new().build();
    let report = run_task(TaskId::CompilePngSprite, project.context(&cfg)).await?;

    assert_eq!(report.files_written, 0);
    assert!(!project.exists("src/assets/img/sprite/sprite.png"));
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn optimized_svg_sprites_stage_separately_per_run() -> TestResult {
    let first = ProjectFixture::new();
    let second = ProjectFixture::new();
    first.write("src/assets/img/sprite/svg/one.svg", r#"<svg viewBox="0 0 1 1"><g id="one"/></svg>"#);
    second.write("src/assets/img/sprite/svg/two.svg", r#"<svg viewBox="0 0 2 2"><g id="two"/></svg>"#);
    let cfg = ConfigFileBuilder::new()
        .with_svg_optimize("cp {input} {output}")
        .build();

    let (a, b) = tokio::join!(
        run_task(TaskId::CompileSvgSprite, first.context(&cfg)),
        run_task(TaskId::CompileSvgSprite, second.context(&cfg)),
    );
    a?;
    b?;

    assert_eq!(
        first.read("src/assets/img/sprite/sprite.svg"),
        sprite_document(&[r#"<symbol id="one" viewBox="0 0 1 1"><g id="one"/></symbol>"#.to_string()])
    );
    assert_eq!(
        second.read("src/assets/img/sprite/sprite.svg"),
        sprite_document(&[r#"<symbol id="two" viewBox="0 0 2 2"><g id="two"/></symbol>"#.to_string()])
    );
    Ok(())
}

#[test]
fn svg_symbol_keeps_view_box_or_derives_it() -> TestResult {
    let with_vb = to_symbol(
        "home",
        r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M0 0h24v24H0z"/></svg>"#,
    )?;
    assert_eq!(
        with_vb,
        r#"<symbol id="home" viewBox="0 0 24 24"><path d="M0 0h24v24H0z"/></symbol>"#
    );

    let sized = to_symbol("dot", r#"<svg width="10px" height="12"><circle r="2"/></svg>"#)?;
    assert_eq!(sized, r#"<symbol id="dot" viewBox="0 0 10 12"><circle r="2"/></symbol>"#);

    assert!(to_symbol("bad", "<div></div>").is_err());
    Ok(())
}

#[tokio::test]
async fn svg_sprite_collects_icons_in_name_order() -> TestResult {
    let project = ProjectFixture::new();
    project.write("src/assets/img/sprite/svg/b.svg", r#"<svg viewBox="0 0 1 1"><g id="b"/></svg>"#);
    project.write("src/assets/img/sprite/svg/a.svg", r#"<svg viewBox="0 0 2 2"><g id="a"/></svg>"#);

    let cfg = ConfigFileBuilder::new().build();
    run_task(TaskId::CompileSvgSprite, project.context(&cfg)).await?;

    let expected = sprite_document(&[
        r#"<symbol id="a" viewBox="0 0 2 2"><g id="a"/></symbol>"#.to_string(),
        r#"<symbol id="b" viewBox="0 0 1 1"><g id="b"/></symbol>"#.to_string(),
    ]);
    assert_eq!(project.read("src/assets/img/sprite/sprite.svg"), expected);
    Ok(())
}
