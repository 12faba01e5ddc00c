use crate::error::{PagePackerError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// PDF points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Converts millimetres to PDF points.
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// Named paper sizes (portrait, in points).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl PageSize {
    /// Portrait `(width, height)` in points.
    pub fn dimensions_pt(self) -> (f64, f64) {
        match self {
            Self::A3 => (mm_to_pt(297.0), mm_to_pt(420.0)),
            Self::A4 => (mm_to_pt(210.0), mm_to_pt(297.0)),
            Self::A5 => (mm_to_pt(148.0), mm_to_pt(210.0)),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
        }
    }
}

impl FromStr for PageSize {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a3" => Ok(Self::A3),
            "a4" => Ok(Self::A4),
            "a5" => Ok(Self::A5),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            _ => Err(()),
        }
    }
}

/// Order in which items are fed to the shelf packer. Every order is stable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Source height, tallest first (NFDH).
    HeightDesc,
    /// Height after fitting to the page, tallest first.
    ScaledHeightDesc,
    /// Keep input order (plain next-fit).
    None,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "height_desc" => Ok(Self::HeightDesc),
            "scaled_height_desc" => Ok(Self::ScaledHeightDesc),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// Fixed page canvas. All values share one unit (points for PDF output).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    /// Empty border kept on all four edges.
    pub margin: f64,
    /// Minimum gap between neighbouring items, horizontally and between shelves.
    pub padding: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    pub fn new(page_width: f64, page_height: f64, margin: f64, padding: f64) -> Self {
        Self {
            page_width,
            page_height,
            margin,
            padding,
        }
    }

    /// Portrait A4 with a 10 mm margin and 5 mm padding.
    pub fn a4() -> Self {
        Self::from_page_size(PageSize::A4, false, mm_to_pt(10.0), mm_to_pt(5.0))
    }

    pub fn from_page_size(size: PageSize, landscape: bool, margin: f64, padding: f64) -> Self {
        let (w, h) = size.dimensions_pt();
        let (w, h) = if landscape { (h, w) } else { (w, h) };
        Self::new(w, h, margin, padding)
    }

    /// Width inside the margins.
    pub fn usable_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Height inside the margins.
    pub fn usable_height(&self) -> f64 {
        self.page_height - 2.0 * self.margin
    }

    /// Validates the geometry.
    ///
    /// Returns `InvalidGeometry` if:
    /// - any value is not finite
    /// - margin or padding is negative
    /// - the margins leave no usable width or height
    /// - padding consumes the whole usable width or height (no item could be scaled to fit)
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("margin", self.margin),
            ("padding", self.padding),
        ];
        for (name, v) in fields {
            if !v.is_finite() {
                return Err(PagePackerError::InvalidGeometry(format!(
                    "{name} must be finite, got {v}"
                )));
            }
        }
        if self.margin < 0.0 || self.padding < 0.0 {
            return Err(PagePackerError::InvalidGeometry(format!(
                "margin ({}) and padding ({}) must not be negative",
                self.margin, self.padding
            )));
        }
        if 2.0 * self.margin >= self.page_width || 2.0 * self.margin >= self.page_height {
            return Err(PagePackerError::InvalidGeometry(format!(
                "margin ({}) * 2 exceeds page dimensions ({}x{})",
                self.margin, self.page_width, self.page_height
            )));
        }
        if self.padding >= self.usable_width() || self.padding >= self.usable_height() {
            return Err(PagePackerError::InvalidGeometry(format!(
                "padding ({}) leaves no room inside the usable area ({}x{})",
                self.padding,
                self.usable_width(),
                self.usable_height()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    #[serde(flatten)]
    pub geometry: PageGeometry,
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,

    /// JPEG quality used when re-encoding preprocessed images (clamped to 1..=100).
    #[serde(default = "default_quality")]
    pub quality: u8,
    /// Colour transparent pixels are flattened onto.
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    /// Crop borders that match the background colour.
    #[serde(default = "default_trim")]
    pub trim: bool,
    /// Max per-channel distance from the background still treated as background.
    #[serde(default)]
    pub trim_threshold: u8,
    /// Preprocess images in parallel when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            sort_order: default_sort_order(),
            quality: default_quality(),
            background: default_background(),
            trim: default_trim(),
            trim_threshold: 0,
            parallel: false,
        }
    }
}

impl PackerConfig {
    /// Validates the configuration. Only the page geometry can be invalid;
    /// quality is clamped where it is used.
    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()
    }

    /// Quality clamped to the range accepted by the JPEG encoder.
    pub fn effective_quality(&self) -> u8 {
        self.quality.clamp(1, 100)
    }

    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}

fn default_sort_order() -> SortOrder {
    SortOrder::HeightDesc
}
fn default_quality() -> u8 {
    85
}
fn default_background() -> [u8; 3] {
    [255, 255, 255]
}
fn default_trim() -> bool {
    true
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn geometry(mut self, g: PageGeometry) -> Self {
        self.cfg.geometry = g;
        self
    }
    pub fn with_page_dimensions(mut self, w: f64, h: f64) -> Self {
        self.cfg.geometry.page_width = w;
        self.cfg.geometry.page_height = h;
        self
    }
    pub fn margin(mut self, v: f64) -> Self {
        self.cfg.geometry.margin = v;
        self
    }
    pub fn padding(mut self, v: f64) -> Self {
        self.cfg.geometry.padding = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn quality(mut self, v: u8) -> Self {
        self.cfg.quality = v;
        self
    }
    pub fn background(mut self, v: [u8; 3]) -> Self {
        self.cfg.background = v;
        self
    }
    pub fn trim(mut self, v: bool) -> Self {
        self.cfg.trim = v;
        self
    }
    pub fn trim_threshold(mut self, v: u8) -> Self {
        self.cfg.trim_threshold = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}
