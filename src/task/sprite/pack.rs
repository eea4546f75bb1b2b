// src/task/sprite/pack.rs

//! Shelf packing for raster sprites.
//!
//! Images are sorted tallest first (ties broken by name) and placed left to
//! right on horizontal shelves. A new shelf opens when the current ones are
//! full or too short. Padding separates neighbours but is not added at the
//! outer edges.

/// Size of one image to pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackItem {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Position of one image in the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Packed sheet at base density.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetLayout {
    pub width: u32,
    pub height: u32,
    /// Sorted by name.
    pub placements: Vec<Placement>,
}

#[derive(Debug)]
struct Shelf {
    y: u32,
    height: u32,
    width_used: u32,
}

pub fn pack(items: &[PackItem], padding: u32) -> SheetLayout {
    if items.is_empty() {
        return SheetLayout::default();
    }

    let mut sorted: Vec<&PackItem> = items.iter().collect();
    sorted.sort_by(|a, b| b.height.cmp(&a.height).then_with(|| a.name.cmp(&b.name)));

    let max_width = shelf_width(items, padding);
    let mut shelves: Vec<Shelf> = Vec::new();
    let mut placements = Vec::with_capacity(items.len());

    for item in sorted {
        let padded_w = item.width + padding;
        let padded_h = item.height + padding;
        let (x, y) = place(&mut shelves, padded_w, padded_h, item.height, max_width);
        placements.push(Placement {
            name: item.name.clone(),
            x,
            y,
            width: item.width,
            height: item.height,
        });
    }

    let used_w = shelves.iter().map(|s| s.width_used).max().unwrap_or(0);
    let used_h = shelves.last().map(|s| s.y + s.height).unwrap_or(0);

    placements.sort_by(|a, b| a.name.cmp(&b.name));
    SheetLayout {
        width: used_w.saturating_sub(padding).max(1),
        height: used_h.saturating_sub(padding).max(1),
        placements,
    }
}

/// Shelf width limit: roughly square sheets, never narrower than the widest
/// image.
fn shelf_width(items: &[PackItem], padding: u32) -> u32 {
    let area: u64 = items
        .iter()
        .map(|i| u64::from(i.width + padding) * u64::from(i.height + padding))
        .sum();
    let side = (area as f64).sqrt().ceil() as u32;
    let widest = items.iter().map(|i| i.width + padding).max().unwrap_or(0);
    side.max(widest)
}

fn place(shelves: &mut Vec<Shelf>, padded_w: u32, padded_h: u32, height: u32, max_width: u32) -> (u32, u32) {
    for shelf in shelves.iter_mut() {
        if height <= shelf.height && shelf.width_used + padded_w <= max_width {
            let x = shelf.width_used;
            shelf.width_used += padded_w;
            return (x, shelf.y);
        }
    }

    let y = shelves.last().map(|s| s.y + s.height).unwrap_or(0);
    shelves.push(Shelf {
        y,
        height: padded_h,
        width_used: padded_w,
    });
    (0, y)
}
