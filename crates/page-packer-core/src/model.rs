use crate::error::{PagePackerError, Result};
use serde::{Deserialize, Serialize};

/// A rectangle to place, in source units (pixels for decoded images).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Label used for diagnostics and to look the image up again at render time.
    pub id: String,
    pub width: f64,
    pub height: f64,
}

impl Item {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }

    /// Width over height of the source rectangle.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Returns `InvalidItem` unless both dimensions are finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !ok(self.width) || !ok(self.height) {
            return Err(PagePackerError::InvalidItem {
                id: self.id.clone(),
                reason: format!(
                    "dimensions must be finite and positive, got {}x{}",
                    self.width, self.height
                ),
            });
        }
        Ok(())
    }
}

/// An item scaled and positioned on a page.
///
/// Origin is the bottom-left corner of the page, y grows upward, so `(x, y)`
/// is the bottom-left corner of the placed rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacedItem {
    /// Right edge (`x + width`).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
    /// Top edge (`y + height`).
    pub fn top(&self) -> f64 {
        self.y + self.height
    }
    /// True if the interiors of both rectangles intersect.
    pub fn overlaps(&self, other: &PlacedItem) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.top() <= other.y
            || other.top() <= self.y)
    }
}

/// A single output page (logical record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: usize,
    pub width: f64,
    pub height: f64,
    /// Placement order: left to right within a shelf, shelves top to bottom.
    pub items: Vec<PlacedItem>,
}

/// Pipeline stage a diagnostic was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Prepare,
    Pack,
    Render,
}

/// A per-item failure that was isolated instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: String,
    pub stage: Stage,
    pub message: String,
}

impl Diagnostic {
    pub fn new(id: impl Into<String>, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stage,
            message: message.into(),
        }
    }
}

/// Layout-level metadata used by exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Schema version of the JSON layout format; current: "1".
    pub schema_version: String,
    pub app: String,
    pub version: String,
    /// Unit of every coordinate in the layout ("pt" for PDF output).
    pub unit: String,
    pub page_size: (f64, f64),
    pub margin: f64,
    pub padding: f64,
}

/// Ordered pages plus the items that had to be skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingResult {
    pub pages: Vec<Page>,
    pub skipped: Vec<Diagnostic>,
    pub meta: Meta,
}

/// Statistics about page usage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    pub num_pages: usize,
    pub num_items: usize,
    pub num_skipped: usize,
    /// Sum of the usable (inside-margin) area of every page.
    pub total_usable_area: f64,
    /// Sum of placed item areas.
    pub used_area: f64,
    /// used_area / total_usable_area (0.0 to 1.0).
    pub occupancy: f64,
    pub avg_items_per_page: f64,
    pub max_items_per_page: usize,
}

impl PackingResult {
    /// Number of placed items across all pages.
    pub fn placed_count(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates `(page_id, item)` pairs in page then placement order.
    pub fn placed(&self) -> impl Iterator<Item = (usize, &PlacedItem)> {
        self.pages
            .iter()
            .flat_map(|p| p.items.iter().map(move |it| (p.id, it)))
    }

    /// Computes packing statistics for this result.
    pub fn stats(&self) -> PackStats {
        let num_pages = self.pages.len();
        let (page_w, page_h) = self.meta.page_size;
        let usable = (page_w - 2.0 * self.meta.margin).max(0.0)
            * (page_h - 2.0 * self.meta.margin).max(0.0);
        let total_usable_area = usable * num_pages as f64;

        let mut num_items = 0;
        let mut used_area = 0.0;
        let mut max_items_per_page = 0;
        for page in &self.pages {
            num_items += page.items.len();
            max_items_per_page = max_items_per_page.max(page.items.len());
            used_area += page
                .items
                .iter()
                .map(|it| it.width * it.height)
                .sum::<f64>();
        }

        let occupancy = if total_usable_area > 0.0 {
            used_area / total_usable_area
        } else {
            0.0
        };
        let avg_items_per_page = if num_pages > 0 {
            num_items as f64 / num_pages as f64
        } else {
            0.0
        };

        PackStats {
            num_pages,
            num_items,
            num_skipped: self.skipped.len(),
            total_usable_area,
            used_area,
            occupancy,
            avg_items_per_page,
            max_items_per_page,
        }
    }
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}, Items: {}, Skipped: {}, Occupancy: {:.2}%, Usable Area: {:.1} pt², Used Area: {:.1} pt²",
            self.num_pages,
            self.num_items,
            self.num_skipped,
            self.occupancy * 100.0,
            self.total_usable_area,
            self.used_area,
        )
    }

    /// Returns unused usable area.
    pub fn wasted_area(&self) -> f64 {
        (self.total_usable_area - self.used_area).max(0.0)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.total_usable_area > 0.0 {
            self.wasted_area() / self.total_usable_area * 100.0
        } else {
            0.0
        }
    }
}
