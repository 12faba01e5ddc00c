//! Page rendering: walks a [`PackingResult`] page by page and hands every
//! placed item to a [`DocumentRenderer`].

use crate::error::Result;
use crate::model::{Diagnostic, Page, PackingResult, PlacedItem, Stage};
use tracing::{info, instrument, warn};

pub mod pdf;

pub use pdf::PdfRenderer;

/// Draws placed items into a paginated document.
///
/// Coordinates arrive exactly as the packer produced them: bottom-left origin,
/// y up, in the layout unit. An error from `draw_item` only affects that item;
/// errors from the page and document steps abort rendering.
pub trait DocumentRenderer {
    type Output;

    fn begin_page(&mut self, page: &Page) -> Result<()>;
    fn draw_item(&mut self, item: &PlacedItem) -> Result<()>;
    fn end_page(&mut self) -> Result<()>;
    fn finish(self) -> Result<Self::Output>;
}

/// Finished document plus the items that could not be drawn.
#[derive(Debug)]
pub struct RenderOutput<T> {
    pub document: T,
    pub failures: Vec<Diagnostic>,
}

#[instrument(skip_all)]
/// Renders every page of `layout` in order, then finalizes the document.
pub fn render_document<R: DocumentRenderer>(
    mut renderer: R,
    layout: &PackingResult,
) -> Result<RenderOutput<R::Output>> {
    let total = layout.pages.len();
    let mut failures = Vec::new();
    for page in &layout.pages {
        info!(
            page = page.id + 1,
            total,
            items = page.items.len(),
            "rendering page"
        );
        renderer.begin_page(page)?;
        for item in &page.items {
            if let Err(e) = renderer.draw_item(item) {
                warn!(id = %item.id, page = page.id, error = %e, "failed to draw item");
                failures.push(Diagnostic::new(&item.id, Stage::Render, e.to_string()));
            }
        }
        renderer.end_page()?;
    }
    let document = renderer.finish()?;
    Ok(RenderOutput { document, failures })
}
