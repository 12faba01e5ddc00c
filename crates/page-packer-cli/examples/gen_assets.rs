use image::{DynamicImage, Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};

fn ensure_dir(p: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(p)?;
    Ok(())
}

fn random_color_opaque(rng: &mut impl Rng) -> [u8; 4] {
    [rng.r#gen(), rng.r#gen(), rng.r#gen(), 255]
}

fn draw_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, c: [u8; 4]) {
    let (iw, ih) = img.dimensions();
    for yy in y.min(ih)..(y.saturating_add(h)).min(ih) {
        for xx in x.min(iw)..(x.saturating_add(w)).min(iw) {
            img.put_pixel(xx, yy, Rgba(c));
        }
    }
}

fn draw_border(img: &mut RgbaImage, t: u32, c: [u8; 4]) {
    let (w, h) = img.dimensions();
    draw_rect(img, 0, 0, w, t, c);
    draw_rect(img, 0, h.saturating_sub(t), w, t, c);
    draw_rect(img, 0, 0, t, h, c);
    draw_rect(img, w.saturating_sub(t), 0, t, h, c);
}

/// Diagonal two-colour gradient, easy to tell apart once scaled on a page.
fn gradient(w: u32, h: u32, a: [u8; 4], b: [u8; 4]) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        let t = (x + y) as f32 / (w + h).max(1) as f32;
        let mix = |i: usize| (a[i] as f32 * (1.0 - t) + b[i] as f32 * t) as u8;
        Rgba([mix(0), mix(1), mix(2), 255])
    })
}

fn photo(rng: &mut impl Rng, w: u32, h: u32) -> RgbaImage {
    let mut img = gradient(w, h, random_color_opaque(rng), random_color_opaque(rng));
    draw_border(&mut img, (w.min(h) / 40).max(2), [20, 20, 20, 255]);
    // a couple of blocks so orientation is visible
    for _ in 0..3 {
        let bw = rng.gen_range(w / 8..=w / 3).max(1);
        let bh = rng.gen_range(h / 8..=h / 3).max(1);
        let x = rng.gen_range(0..w.saturating_sub(bw).max(1));
        let y = rng.gen_range(0..h.saturating_sub(bh).max(1));
        draw_rect(&mut img, x, y, bw, bh, random_color_opaque(rng));
    }
    img
}

/// Mixed portrait/landscape photos saved as PNG and JPEG.
fn gen_photos(dir: &Path, rng: &mut impl Rng) -> anyhow::Result<()> {
    ensure_dir(dir)?;
    for i in 0..24 {
        let w = rng.gen_range(320..=2400);
        let h = rng.gen_range(320..=2400);
        let img = photo(rng, w, h);
        if i % 2 == 0 {
            img.save(dir.join(format!("photo_{:02}.png", i)))?;
        } else {
            DynamicImage::ImageRgba8(img)
                .to_rgb8()
                .save(dir.join(format!("photo_{:02}.jpg", i)))?;
        }
    }
    Ok(())
}

/// Extreme aspect ratios: tall strips share shelves, wide banners stack.
fn gen_strips(dir: &Path, rng: &mut impl Rng) -> anyhow::Result<()> {
    ensure_dir(dir)?;
    for i in 0..10 {
        let long = rng.gen_range(800..=3000);
        let short = rng.gen_range(20..=120);
        photo(rng, short, long).save(dir.join(format!("tall_{:02}.png", i)))?;
        photo(rng, long, short).save(dir.join(format!("wide_{:02}.png", i)))?;
    }
    Ok(())
}

/// Content surrounded by transparent or white borders, exercising flatten + trim.
fn gen_trim_cases(dir: &Path, rng: &mut impl Rng) -> anyhow::Result<()> {
    ensure_dir(dir)?;
    for i in 0..8 {
        let w = rng.gen_range(200..=900);
        let h = rng.gen_range(200..=900);
        let bg = if i % 2 == 0 {
            [0, 0, 0, 0]
        } else {
            [255, 255, 255, 255]
        };
        let mut img = RgbaImage::from_pixel(w, h, Rgba(bg));
        let cw = rng.gen_range(w / 4..=w / 2);
        let ch = rng.gen_range(h / 4..=h / 2);
        let x = rng.gen_range(0..=w - cw);
        let y = rng.gen_range(0..=h - ch);
        let inner = photo(rng, cw, ch);
        image::imageops::overlay(&mut img, &inner, x as i64, y as i64);
        img.save(dir.join(format!("trim_{:02}.png", i)))?;
    }
    // semi-transparent wash: flattens to a pale tint
    let mut wash = gradient(400, 300, [255, 0, 0, 255], [0, 0, 255, 255]);
    for px in wash.pixels_mut() {
        px[3] = 96;
    }
    wash.save(dir.join("wash.png"))?;
    // fully transparent: nothing to crop, still placed
    RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 0])).save(dir.join("empty.png"))?;
    Ok(())
}

/// Animated-format and bitmap inputs (first frame / plain RGB).
fn gen_other_formats(dir: &Path, rng: &mut impl Rng) -> anyhow::Result<()> {
    ensure_dir(dir)?;
    photo(rng, 480, 360).save(dir.join("still.gif"))?;
    DynamicImage::ImageRgba8(photo(rng, 360, 480))
        .to_rgb8()
        .save(dir.join("scan.bmp"))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Usage: cargo run -p page-packer-cli --example gen_assets -- [out_root]
    // Default out_root: input_images
    let out_root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("input_images"));
    ensure_dir(&out_root)?;

    let mut rng = rand::rngs::StdRng::seed_from_u64(0xDEADBEEF);
    gen_photos(&out_root.join("photos"), &mut rng)?;
    gen_strips(&out_root.join("strips"), &mut rng)?;
    gen_trim_cases(&out_root.join("trim"), &mut rng)?;
    gen_other_formats(&out_root.join("formats"), &mut rng)?;

    fs::write(
        out_root.join("README.txt"),
        "Generated test image sets: photos, strips, trim, formats.",
    )?;
    println!("Generated assets under {}", out_root.display());
    Ok(())
}
