//! Core library for packing images onto fixed-size print pages.
//!
//! - Algorithm: Next-Fit Decreasing Height shelf packing with per-item scaling (aspect ratio kept, no rotation)
//! - Pipeline: `pack_layout` packs plain rectangles; `pack_images` flattens, trims and re-encodes images first
//! - Rendering: `render_document` drives any `DocumentRenderer`; `PdfRenderer` writes a PDF via `printpdf`
//! - Data model is serde-serializable; `to_json` exports a layout.
//!
//! Quick example:
//! ```ignore
//! use page_packer_core::{Item, PackerConfig, pack_layout};
//! # fn main() -> page_packer_core::Result<()> {
//! let items = vec![Item::new("a", 100.0, 200.0), Item::new("b", 50.0, 50.0)];
//! let layout = pack_layout(items, &PackerConfig::default())?;
//! println!("pages: {}", layout.pages.len());
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod preprocess;
pub mod render;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use preprocess::*;

/// Convenience prelude for common types and functions.
/// Importing `page_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        PackerConfig, PackerConfigBuilder, PageGeometry, PageSize, SortOrder, mm_to_pt,
    };
    pub use crate::error::{PagePackerError, Result};
    pub use crate::model::{
        Diagnostic, Item, Meta, PackStats, PackingResult, Page, PlacedItem, Stage,
    };
    pub use crate::preprocess::{InputImage, PreparedImage};
    pub use crate::render::{DocumentRenderer, PdfRenderer, RenderOutput, render_document};
    pub use crate::{PackOutput, pack_images, pack_layout, to_json};
}
