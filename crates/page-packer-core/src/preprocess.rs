use crate::config::PackerConfig;
use crate::error::{PagePackerError, Result};
use crate::model::{Diagnostic, Item, Stage};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// In-memory image to pack (key + decoded image).
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

/// An image after flattening, cropping and re-encoding, ready to be placed and drawn.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub id: String,
    pub width: u32,
    pub height: u32,
    /// True if background borders were cropped away.
    pub trimmed: bool,
    /// Re-encoded JPEG bytes.
    pub jpeg: Vec<u8>,
}

impl PreparedImage {
    /// The rectangle handed to the packer.
    pub fn item(&self) -> Item {
        Item::new(self.id.clone(), self.width as f64, self.height as f64)
    }
}

/// Alpha-composites `image` onto a solid `background`, dropping transparency.
pub fn flatten_onto(image: &DynamicImage, background: [u8; 3]) -> RgbImage {
    let rgba = image.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut out = RgbImage::new(w, h);
    for (x, y, px) in rgba.enumerate_pixels() {
        let a = px[3] as u32;
        let blend =
            |c: u8, b: u8| ((c as u32 * a + b as u32 * (255 - a) + 127) / 255) as u8;
        out.put_pixel(
            x,
            y,
            Rgb([
                blend(px[0], background[0]),
                blend(px[1], background[1]),
                blend(px[2], background[2]),
            ]),
        );
    }
    out
}

/// Bounding box `(x, y, w, h)` of the pixels that differ from `background` by
/// more than `threshold` on any channel. `None` if the image is all background.
pub fn compute_content_rect(
    rgb: &RgbImage,
    background: [u8; 3],
    threshold: u8,
) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = rgb.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let is_content = |x: u32, y: u32| {
        let px = rgb.get_pixel(x, y);
        (0..3).any(|c| px[c].abs_diff(background[c]) > threshold)
    };
    let column_empty = |x: u32| (0..h).all(|y| !is_content(x, y));

    let mut x1 = 0;
    while x1 < w && column_empty(x1) {
        x1 += 1;
    }
    if x1 >= w {
        return None;
    }
    let mut x2 = w - 1;
    while x2 > x1 && column_empty(x2) {
        x2 -= 1;
    }
    let row_empty = |y: u32| (x1..=x2).all(|x| !is_content(x, y));
    let mut y1 = 0;
    while y1 < h && row_empty(y1) {
        y1 += 1;
    }
    let mut y2 = h - 1;
    while y2 > y1 && row_empty(y2) {
        y2 -= 1;
    }
    Some((x1, y1, x2 - x1 + 1, y2 - y1 + 1))
}

/// Encodes `rgb` as JPEG. `quality` is passed through to the encoder after clamping to 1..=100.
pub fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .encode_image(rgb)
        .map_err(|e| PagePackerError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Flattens, optionally trims, and re-encodes one image.
pub fn prepare_image(input: &InputImage, cfg: &PackerConfig) -> Result<PreparedImage> {
    let (w, h) = (input.image.width(), input.image.height());
    if w == 0 || h == 0 {
        return Err(PagePackerError::InvalidItem {
            id: input.key.clone(),
            reason: format!("image has no pixels ({w}x{h})"),
        });
    }
    let flat = flatten_onto(&input.image, cfg.background);
    let (rgb, trimmed) = if cfg.trim {
        match compute_content_rect(&flat, cfg.background, cfg.trim_threshold) {
            Some((x, y, cw, ch)) if (cw, ch) != (w, h) => (
                image::imageops::crop_imm(&flat, x, y, cw, ch).to_image(),
                true,
            ),
            _ => (flat, false),
        }
    } else {
        (flat, false)
    };
    let jpeg = encode_jpeg(&rgb, cfg.effective_quality())?;
    debug!(
        key = %input.key,
        width = rgb.width(),
        height = rgb.height(),
        trimmed,
        bytes = jpeg.len(),
        "prepared image"
    );
    Ok(PreparedImage {
        id: input.key.clone(),
        width: rgb.width(),
        height: rgb.height(),
        trimmed,
        jpeg,
    })
}

/// Prepares a batch of images. Results keep input order, also when prepared in parallel;
/// images that fail are reported as diagnostics instead of aborting the batch.
pub fn prepare_images(
    inputs: &[InputImage],
    cfg: &PackerConfig,
) -> (Vec<PreparedImage>, Vec<Diagnostic>) {
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            let results: Vec<Result<PreparedImage>> = inputs
                .par_iter()
                .map(|inp| prepare_image(inp, cfg))
                .collect();
            return collect_prepared(inputs, results);
        }
    }
    let results: Vec<Result<PreparedImage>> = inputs
        .iter()
        .map(|inp| prepare_image(inp, cfg))
        .collect();
    collect_prepared(inputs, results)
}

fn collect_prepared(
    inputs: &[InputImage],
    results: Vec<Result<PreparedImage>>,
) -> (Vec<PreparedImage>, Vec<Diagnostic>) {
    let mut prepared = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (inp, res) in inputs.iter().zip(results) {
        match res {
            Ok(p) => prepared.push(p),
            Err(e) => {
                warn!(key = %inp.key, error = %e, "skip image");
                failures.push(Diagnostic::new(&inp.key, Stage::Prepare, e.to_string()));
            }
        }
    }
    (prepared, failures)
}
