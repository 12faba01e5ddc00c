use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::{DynamicImage, ImageReader};
use page_packer_core::config::{PageGeometry, PageSize, SortOrder, mm_to_pt};
use page_packer_core::{
    InputImage, Item, PackerConfig, PackingResult, PagePackerError, pack_images, pack_layout,
    stats_json, to_json,
};
use serde::Deserialize;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "page-packer",
    about = "Pack a folder of images onto print pages and write a PDF",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Preprocess images, pack them onto pages and write a PDF
    Pack(PackArgs),
    /// Layout-only export: pack image sizes read from file headers and write JSON
    Layout(PackArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input file or directory
    #[arg(default_value = "input_images", help_heading = "Input/Output")]
    input: PathBuf,
    /// Output PDF path
    #[arg(short, long, default_value = "output.pdf", help_heading = "Input/Output")]
    output: PathBuf,
    /// Document title stored in the PDF metadata
    #[arg(long, default_value = "Packed images", help_heading = "Input/Output")]
    title: String,
    /// YAML config file path (values override the command line)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Page
    /// Paper size: a3 | a4 | a5 | letter | legal
    #[arg(long, default_value = "a4", value_parser = ["a3", "a4", "a5", "letter", "legal"], help_heading = "Page")]
    page: String,
    /// Rotate the paper to landscape
    #[arg(long, default_value_t = false, help_heading = "Page")]
    landscape: bool,
    /// Custom page width in points (overrides --page)
    #[arg(long, requires = "page_height_pt", help_heading = "Page")]
    page_width_pt: Option<f64>,
    /// Custom page height in points (overrides --page)
    #[arg(long, requires = "page_width_pt", help_heading = "Page")]
    page_height_pt: Option<f64>,
    /// Margin around the page edge, in millimetres
    #[arg(long, default_value_t = 10.0, help_heading = "Page")]
    margin_mm: f64,
    /// Gap between neighbouring images, in millimetres
    #[arg(long, default_value_t = 5.0, help_heading = "Page")]
    padding_mm: f64,
    /// Sort order: height_desc|scaled_height_desc|none
    #[arg(long, default_value = "height_desc", help_heading = "Page")]
    sort_order: String,

    // Image Processing
    /// JPEG quality for embedded images (1..=100)
    #[arg(long, default_value_t = 85, help_heading = "Image Processing")]
    quality: u8,
    /// Background colour transparency is flattened onto (hex RRGGBB)
    #[arg(long, default_value = "ffffff", help_heading = "Image Processing")]
    background: String,
    /// Crop borders matching the background colour
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Image Processing")]
    trim: bool,
    /// Per-channel distance from the background still treated as border (0..=255)
    #[arg(long, default_value_t = 0, help_heading = "Image Processing")]
    trim_threshold: u8,
    /// Preprocess images in parallel (requires the `parallel` feature)
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    parallel: bool,

    // Export
    /// Also write the computed layout (JSON) to this file
    #[arg(long, help_heading = "Export")]
    layout_json: Option<PathBuf>,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => run_layout(args),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;
    if cli.print_config {
        return print_config(&cfg, &cli.print_config_format);
    }
    cfg.validate()?;

    let paths = find_images(cli)?;
    let inputs = load_images_with_progress(&paths, show_progress)?;
    if inputs.is_empty() {
        anyhow::bail!("none of the {} image files could be read", paths.len());
    }
    info!(count = inputs.len(), "loaded input images");

    let started = Instant::now();
    let out = pack_images(inputs, &cfg)?;
    let pack_time = started.elapsed();
    report_skipped(&out.layout);
    if out.layout.is_empty() {
        return Err(PagePackerError::Empty).context("no image could be placed");
    }
    info!(
        pages = out.layout.pages.len(),
        placed = out.layout.placed_count(),
        took = %fmt_dur(pack_time),
        "layout computed"
    );

    write_exports(cli, &out.layout)?;
    if cli.dry_run {
        println!("{}", out.stats().summary());
        return Ok(());
    }

    let started = Instant::now();
    let rendered = out.render_pdf(&cli.title)?;
    for f in &rendered.failures {
        error!(id = %f.id, error = %f.message, "image left out of the document");
    }
    fs::write(&cli.output, &rendered.document)
        .with_context(|| format!("write {}", cli.output.display()))?;
    info!(
        output = ?cli.output,
        pages = out.layout.pages.len(),
        failed = rendered.failures.len(),
        took = %fmt_dur(started.elapsed()),
        "pdf written"
    );
    Ok(())
}

fn run_layout(cli: &PackArgs) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;
    if cli.print_config {
        return print_config(&cfg, &cli.print_config_format);
    }
    cfg.validate()?;

    let paths = find_images(cli)?;
    let mut items = Vec::with_capacity(paths.len());
    for p in &paths {
        match image::image_dimensions(p) {
            Ok((w, h)) => items.push(Item::new(path_key(p), w as f64, h as f64)),
            Err(e) => error!(?p, error = %e, "skip image"),
        }
    }
    if items.is_empty() {
        anyhow::bail!("none of the {} image files could be read", paths.len());
    }

    let layout = pack_layout(items, &cfg)?;
    report_skipped(&layout);
    if layout.is_empty() {
        return Err(PagePackerError::Empty).context("no image could be placed");
    }

    let json_path = cli
        .layout_json
        .clone()
        .unwrap_or_else(|| cli.output.with_extension("json"));
    if cli.dry_run {
        println!("{}", layout.stats().summary());
    } else {
        fs::write(&json_path, serde_json::to_string_pretty(&to_json(&layout))?)
            .with_context(|| format!("write {}", json_path.display()))?;
        info!(?json_path, pages = layout.pages.len(), "layout written");
    }
    if let Some(stats_path) = &cli.export_stats {
        write_stats(stats_path, &layout, cli.dry_run)?;
    }
    Ok(())
}

/// Command-line values first, then the YAML file on top.
fn build_config(cli: &PackArgs) -> anyhow::Result<PackerConfig> {
    let page: PageSize = cli
        .page
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown page size: {}", cli.page))?;
    let mut geometry = PageGeometry::from_page_size(
        page,
        cli.landscape,
        mm_to_pt(cli.margin_mm),
        mm_to_pt(cli.padding_mm),
    );
    if let (Some(w), Some(h)) = (cli.page_width_pt, cli.page_height_pt) {
        geometry.page_width = w;
        geometry.page_height = h;
    }
    let cfg = PackerConfig::builder()
        .geometry(geometry)
        .sort_order(parse_sort_order(&cli.sort_order)?)
        .quality(cli.quality)
        .background(parse_color(&cli.background)?)
        .trim(cli.trim)
        .trim_threshold(cli.trim_threshold)
        .parallel(cli.parallel)
        .build();

    match &cli.config {
        Some(path) => {
            let file = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            let y: YamlConfig = serde_yaml::from_str(&file)
                .with_context(|| format!("parse config {}", path.display()))?;
            y.into_packer_config(cfg, cli.landscape)
        }
        None => Ok(cfg),
    }
}

fn print_config(cfg: &PackerConfig, format: &str) -> anyhow::Result<()> {
    match format {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(())
}

fn find_images(cli: &PackArgs) -> anyhow::Result<Vec<PathBuf>> {
    if !cli.input.exists() {
        anyhow::bail!("input path {} does not exist", cli.input.display());
    }
    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no images found in {}", cli.input.display());
    }
    info!(count = paths.len(), input = ?cli.input, "found images");
    Ok(paths)
}

fn report_skipped(layout: &PackingResult) {
    for d in &layout.skipped {
        warn!(id = %d.id, stage = ?d.stage, error = %d.message, "image skipped");
    }
}

fn write_exports(cli: &PackArgs, layout: &PackingResult) -> anyhow::Result<()> {
    if let Some(json_path) = &cli.layout_json {
        if !cli.dry_run {
            fs::write(json_path, serde_json::to_string_pretty(&to_json(layout))?)
                .with_context(|| format!("write {}", json_path.display()))?;
            info!(?json_path, "layout exported");
        }
    }
    if let Some(stats_path) = &cli.export_stats {
        write_stats(stats_path, layout, cli.dry_run)?;
    }
    Ok(())
}

fn write_stats(stats_path: &Path, layout: &PackingResult, dry_run: bool) -> anyhow::Result<()> {
    let value = stats_json(layout);
    if dry_run {
        let stats = layout.stats();
        println!(
            "pages={} items={} used_area={:.1} usable_area={:.1} occupancy={:.2}%",
            stats.num_pages,
            stats.num_items,
            stats.used_area,
            stats.total_usable_area,
            stats.occupancy * 100.0
        );
        return Ok(());
    }
    fs::write(stats_path, serde_json::to_string_pretty(&value)?)
        .with_context(|| format!("write {}", stats_path.display()))?;
    info!(?stats_path, "stats exported");
    Ok(())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}µs", d.as_micros())
    }
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        // Sorted walk so page order does not depend on directory listing order
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

/// `None` when no patterns are given, so an empty include list matches everything.
fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("invalid glob '{}'", pat))?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(
    p: &Path,
    include: Option<&GlobSet>,
    exclude: Option<&GlobSet>,
) -> bool {
    let s = path_key(p);
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

fn is_image(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

fn path_key(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}

fn load_images_with_progress(paths: &[PathBuf], progress: bool) -> anyhow::Result<Vec<InputImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_image(p) {
            Ok(img) => list.push(InputImage {
                key: path_key(p),
                image: img,
            }),
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    page: Option<String>,
    landscape: Option<bool>,
    page_width: Option<f64>,
    page_height: Option<f64>,
    margin_mm: Option<f64>,
    padding_mm: Option<f64>,
    sort_order: Option<String>,
    quality: Option<u8>,
    background: Option<String>,
    trim: Option<bool>,
    trim_threshold: Option<u8>,
    parallel: Option<bool>,
}

impl YamlConfig {
    /// Overlays the file on `cfg`; `landscape` is the orientation chosen on the command line.
    fn into_packer_config(
        self,
        mut cfg: PackerConfig,
        landscape: bool,
    ) -> anyhow::Result<PackerConfig> {
        let g = &mut cfg.geometry;
        // Orientation is applied after the size so a YAML `page` keeps the command-line orientation.
        if self.page.is_some() || self.landscape.is_some() {
            let (w, h) = match &self.page {
                Some(v) => v
                    .parse::<PageSize>()
                    .map_err(|_| anyhow::anyhow!("unknown page size in config: {}", v))?
                    .dimensions_pt(),
                None => (g.page_width, g.page_height),
            };
            let (short, long) = (w.min(h), w.max(h));
            (g.page_width, g.page_height) = if self.landscape.unwrap_or(landscape) {
                (long, short)
            } else {
                (short, long)
            };
        }
        if let Some(v) = self.page_width {
            g.page_width = v;
        }
        if let Some(v) = self.page_height {
            g.page_height = v;
        }
        if let Some(v) = self.margin_mm {
            g.margin = mm_to_pt(v);
        }
        if let Some(v) = self.padding_mm {
            g.padding = mm_to_pt(v);
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = parse_sort_order(&v)?;
        }
        if let Some(v) = self.quality {
            cfg.quality = v;
        }
        if let Some(v) = self.background {
            cfg.background = parse_color(&v)?;
        }
        if let Some(v) = self.trim {
            cfg.trim = v;
        }
        if let Some(v) = self.trim_threshold {
            cfg.trim_threshold = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown sort order: {}", s))
}

/// Parses `RRGGBB` (optionally prefixed with `#`).
fn parse_color(s: &str) -> anyhow::Result<[u8; 3]> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        anyhow::bail!("invalid colour '{}', expected RRGGBB", s);
    }
    let mut rgb = [0u8; 3];
    for (i, c) in rgb.iter_mut().enumerate() {
        *c = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .with_context(|| format!("invalid colour '{}'", s))?;
    }
    Ok(rgb)
}
