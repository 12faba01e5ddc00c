use super::Packer;
use crate::config::PageGeometry;
use crate::model::PlacedItem;

/// Largest uniform scale of a `width x height` rectangle that fits the usable
/// page area with one padding unit of slack on each axis.
///
/// The result may enlarge or shrink the source; one side always lands exactly
/// on its bound, so every item fits on an empty page.
pub fn scale_to_fit(width: f64, height: f64, geometry: &PageGeometry) -> (f64, f64) {
    let s = ((geometry.usable_width() - geometry.padding) / width)
        .min((geometry.usable_height() - geometry.padding) / height);
    (width * s, height * s)
}

/// Where the next rectangle would go on a `ShelfPage`.
#[derive(Clone, Copy, Debug)]
struct Slot {
    x: f64,
    /// Top edge of the shelf the rectangle lands on.
    shelf_top: f64,
    opens_shelf: bool,
}

/// Next-fit shelf state for one page.
///
/// Shelves hang from the top margin and stack downwards; items fill a shelf
/// left to right. Only the newest shelf is ever open.
pub struct ShelfPage {
    geometry: PageGeometry,
    /// Next insertion point on the open shelf.
    x: f64,
    /// Top edge of the open shelf.
    y: f64,
    shelf_height: f64,
    shelf_items: usize,
    placed: usize,
}

impl ShelfPage {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            x: geometry.margin,
            y: geometry.page_height - geometry.margin,
            shelf_height: 0.0,
            shelf_items: 0,
            placed: 0,
            geometry,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.placed == 0
    }

    fn next_slot(&self, width: f64, height: f64) -> Option<Slot> {
        let g = &self.geometry;
        // An empty shelf always takes the item; closing it would only move the cursor down.
        let slot = if self.shelf_items > 0 && self.x + width + g.padding > g.page_width - g.margin
        {
            Slot {
                x: g.margin,
                shelf_top: self.y - (self.shelf_height + g.padding),
                opens_shelf: true,
            }
        } else {
            Slot {
                x: self.x,
                shelf_top: self.y,
                opens_shelf: false,
            }
        };
        // Checked for every item, so a tall item joining an open shelf cannot
        // hang below the bottom margin. A fresh page accepts anything.
        if self.placed > 0 && slot.shelf_top - height < g.margin {
            return None;
        }
        Some(slot)
    }
}

impl Packer for ShelfPage {
    fn can_place(&self, width: f64, height: f64) -> bool {
        self.next_slot(width, height).is_some()
    }

    fn place(&mut self, id: String, width: f64, height: f64) -> Option<PlacedItem> {
        let slot = self.next_slot(width, height)?;
        if slot.opens_shelf {
            self.y = slot.shelf_top;
            self.shelf_height = 0.0;
            self.shelf_items = 0;
        }
        let item = PlacedItem {
            id,
            x: slot.x,
            y: slot.shelf_top - height,
            width,
            height,
        };
        self.x = slot.x + width + self.geometry.padding;
        self.shelf_height = self.shelf_height.max(height);
        self.shelf_items += 1;
        self.placed += 1;
        Some(item)
    }
}
