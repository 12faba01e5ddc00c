use crate::model::PlacedItem;

pub mod shelf;

/// A packer places already-scaled rectangles onto a single page.
///
/// Implementations must keep every placement inside the page margins and
/// separated from its neighbours by the configured padding.
/// `place` returns `None` when the rectangle does not fit on the current page;
/// an empty page must accept any rectangle that fits its usable area.
pub trait Packer {
    fn can_place(&self, width: f64, height: f64) -> bool;
    fn place(&mut self, id: String, width: f64, height: f64) -> Option<PlacedItem>;
}
