use super::DocumentRenderer;
use crate::error::{PagePackerError, Result};
use crate::model::{Page, PlacedItem};
use crate::preprocess::PreparedImage;
use printpdf::image::RawImage;
use printpdf::ops::Op;
use printpdf::xobject::{XObject, XObjectTransform};
use printpdf::{Mm, PdfDocument, PdfPage, PdfSaveOptions, Pt, XObjectId};
use std::collections::HashMap;
use tracing::debug;

/// Renders packed pages into a PDF, one image XObject per prepared image.
///
/// Layout units are PDF points. Images are embedded at 72 dpi so one source
/// pixel maps to one point before the per-item scale is applied.
pub struct PdfRenderer<'a> {
    document: PdfDocument,
    images: HashMap<&'a str, &'a PreparedImage>,
    xobjects: HashMap<String, (XObjectId, (u32, u32))>,
    ops: Vec<Op>,
    page_size: (f64, f64),
}

impl<'a> PdfRenderer<'a> {
    pub fn new(title: &str, images: &'a [PreparedImage]) -> Self {
        Self {
            document: PdfDocument::new(title),
            images: images.iter().map(|p| (p.id.as_str(), p)).collect(),
            xobjects: HashMap::new(),
            ops: Vec::new(),
            page_size: (0.0, 0.0),
        }
    }

    /// Looks up (or decodes and registers) the XObject for `id`.
    fn xobject_for(&mut self, id: &str) -> Result<(XObjectId, (u32, u32))> {
        if let Some(cached) = self.xobjects.get(id) {
            return Ok(cached.clone());
        }
        let prepared = self
            .images
            .get(id)
            .ok_or_else(|| PagePackerError::Render(format!("no image data for '{id}'")))?;
        let mut warnings = Vec::new();
        let raw = RawImage::decode_from_bytes(&prepared.jpeg, &mut warnings).map_err(|e| {
            PagePackerError::Render(format!("failed to decode image data for '{id}': {e}"))
        })?;
        let dims = (raw.width as u32, raw.height as u32);
        if dims.0 == 0 || dims.1 == 0 {
            return Err(PagePackerError::Render(format!("image '{id}' decoded to zero size")));
        }
        let xobj_id = XObjectId::new();
        self.document
            .resources
            .xobjects
            .map
            .insert(xobj_id.clone(), XObject::Image(raw));
        self.xobjects
            .insert(id.to_string(), (xobj_id.clone(), dims));
        Ok((xobj_id, dims))
    }
}

impl DocumentRenderer for PdfRenderer<'_> {
    type Output = Vec<u8>;

    fn begin_page(&mut self, page: &Page) -> Result<()> {
        self.ops.clear();
        self.page_size = (page.width, page.height);
        Ok(())
    }

    fn draw_item(&mut self, item: &PlacedItem) -> Result<()> {
        let (id, (img_w, img_h)) = self.xobject_for(&item.id)?;
        // PDF user space already has its origin bottom-left, like the layout.
        let transform = XObjectTransform {
            translate_x: Some(Pt(item.x as f32)),
            translate_y: Some(Pt(item.y as f32)),
            scale_x: Some(item.width as f32 / img_w as f32),
            scale_y: Some(item.height as f32 / img_h as f32),
            rotate: None,
            dpi: Some(72.0),
        };
        self.ops.push(Op::UseXobject { id, transform });
        Ok(())
    }

    fn end_page(&mut self) -> Result<()> {
        let (w, h) = self.page_size;
        let ops = std::mem::take(&mut self.ops);
        debug!(page = self.document.pages.len(), ops = ops.len(), "page finished");
        self.document.pages.push(PdfPage::new(
            Mm::from(Pt(w as f32)),
            Mm::from(Pt(h as f32)),
            ops,
        ));
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        let mut warnings = Vec::new();
        let bytes = self.document.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(count = warnings.len(), "pdf writer reported warnings");
        }
        Ok(bytes)
    }
}
