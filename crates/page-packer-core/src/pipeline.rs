use crate::config::{PackerConfig, PageGeometry, SortOrder};
use crate::error::{PagePackerError, Result};
use crate::model::{Diagnostic, Item, Meta, PackStats, PackingResult, Page, PlacedItem, Stage};
use crate::packer::Packer;
use crate::packer::shelf::{ShelfPage, scale_to_fit};
use crate::preprocess::{InputImage, PreparedImage, prepare_images};
use crate::render::{PdfRenderer, RenderOutput, render_document};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Output of a full run: the layout and the prepared images it refers to.
pub struct PackOutput {
    pub layout: PackingResult,
    pub images: Vec<PreparedImage>,
}

impl PackOutput {
    /// Computes packing statistics for this output.
    /// This is a convenience method that delegates to `layout.stats()`.
    pub fn stats(&self) -> PackStats {
        self.layout.stats()
    }

    /// Renders the layout into PDF bytes. Items that fail to draw are reported, not fatal.
    pub fn render_pdf(&self, title: &str) -> Result<RenderOutput<Vec<u8>>> {
        render_document(PdfRenderer::new(title, &self.images), &self.layout)
    }
}

#[instrument(skip_all)]
/// Preprocesses `inputs` and packs the resulting rectangles onto pages.
///
/// Notes:
/// - Geometry is validated first; an invalid geometry is the only fatal error.
/// - Images that fail to prepare, or repeat an earlier key, are skipped and listed in `layout.skipped`.
/// - Zero inputs produce an empty layout, not an error.
pub fn pack_images(inputs: Vec<InputImage>, cfg: &PackerConfig) -> Result<PackOutput> {
    cfg.validate()?;

    let (inputs, mut skipped) = dedup_keys(inputs);
    let (images, mut failed) = prepare_images(&inputs, cfg);
    drop(inputs);
    skipped.append(&mut failed);
    info!(count = images.len(), skipped = skipped.len(), "prepared images");

    let items: Vec<Item> = images.iter().map(PreparedImage::item).collect();
    let mut layout = pack_layout(items, cfg)?;
    skipped.append(&mut layout.skipped);
    layout.skipped = skipped;
    Ok(PackOutput { layout, images })
}

/// Keeps the first image for each key; later ones could not be told apart at render time.
fn dedup_keys(inputs: Vec<InputImage>) -> (Vec<InputImage>, Vec<Diagnostic>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(inputs.len());
    let mut skipped = Vec::new();
    for inp in inputs {
        if seen.insert(inp.key.clone()) {
            kept.push(inp);
        } else {
            warn!(key = %inp.key, "skip image with duplicate key");
            skipped.push(Diagnostic::new(&inp.key, Stage::Prepare, "duplicate image key"));
        }
    }
    (kept, skipped)
}

/// Item with its page-fitted size.
struct Prep {
    item: Item,
    width: f64,
    height: f64,
}

#[instrument(skip_all)]
/// Packs rectangles onto pages with Next-Fit Decreasing Height.
///
/// Items are sorted once (stable, per `cfg.sort_order`), scaled to the largest
/// size that fits the usable page area, then placed left to right on shelves
/// that stack down the page. A page is closed when the next item no longer
/// fits below the open shelf. Items with non-positive or non-finite
/// dimensions, or whose scaled size over- or underflows, are skipped and
/// reported in `skipped`.
pub fn pack_layout(items: Vec<Item>, cfg: &PackerConfig) -> Result<PackingResult> {
    cfg.validate()?;
    let geometry = cfg.geometry;

    let mut skipped = Vec::new();
    let mut prepared: Vec<Prep> = Vec::with_capacity(items.len());
    for item in items {
        if let Err(e) = item.validate() {
            warn!(id = %item.id, error = %e, "skip item");
            skipped.push(Diagnostic::new(&item.id, Stage::Pack, e.to_string()));
            continue;
        }
        let (width, height) = scale_to_fit(item.width, item.height, &geometry);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            let reason = format!(
                "{}x{} cannot be scaled onto the page (got {}x{})",
                item.width, item.height, width, height
            );
            warn!(id = %item.id, %reason, "skip item");
            skipped.push(Diagnostic::new(&item.id, Stage::Pack, reason));
            continue;
        }
        prepared.push(Prep {
            item,
            width,
            height,
        });
    }

    // sort_by is stable: equal keys keep input order
    match cfg.sort_order {
        SortOrder::None => {}
        SortOrder::HeightDesc => {
            prepared.sort_by(|a, b| b.item.height.total_cmp(&a.item.height));
        }
        SortOrder::ScaledHeightDesc => {
            prepared.sort_by(|a, b| b.height.total_cmp(&a.height));
        }
    }

    let pages = paginate(prepared, &geometry)?;
    let result = PackingResult {
        pages,
        skipped,
        meta: layout_meta(&geometry),
    };
    info!(
        pages = result.pages.len(),
        placed = result.placed_count(),
        skipped = result.skipped.len(),
        "packed items"
    );
    Ok(result)
}

fn paginate(prepared: Vec<Prep>, geometry: &PageGeometry) -> Result<Vec<Page>> {
    let mut pages: Vec<Page> = Vec::new();
    let mut current: Vec<PlacedItem> = Vec::new();
    let mut packer = ShelfPage::new(*geometry);

    for p in prepared {
        if !packer.can_place(p.width, p.height) {
            close_page(&mut pages, &mut current, geometry);
            packer = ShelfPage::new(*geometry);
        }
        let placed = packer
            .place(p.item.id.clone(), p.width, p.height)
            .ok_or_else(|| PagePackerError::InvalidItem {
                id: p.item.id.clone(),
                reason: "does not fit on an empty page".into(),
            })?;
        current.push(placed);
    }
    close_page(&mut pages, &mut current, geometry);
    Ok(pages)
}

/// Moves the accumulated placements into a new page; empty pages are never emitted.
fn close_page(pages: &mut Vec<Page>, current: &mut Vec<PlacedItem>, geometry: &PageGeometry) {
    if current.is_empty() {
        return;
    }
    let id = pages.len();
    debug!(page = id, items = current.len(), "page closed");
    pages.push(Page {
        id,
        width: geometry.page_width,
        height: geometry.page_height,
        items: std::mem::take(current),
    });
}

fn layout_meta(geometry: &PageGeometry) -> Meta {
    Meta {
        schema_version: "1".into(),
        app: "page-packer".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        unit: "pt".into(),
        page_size: (geometry.page_width, geometry.page_height),
        margin: geometry.margin,
        padding: geometry.padding,
    }
}
