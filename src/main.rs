// shape-painter/src/main.rs
// Greedy shape painter: approximates an image with rectangles or triangles
// -----------------------------------------------------------------------------
// BUILD
//   cargo run --release -- \
//     --input original.jpg --output out.png \
//     --shape triangle --iterations 5000 --batch-size 200
// -----------------------------------------------------------------------------
// Crates
//   image      – load & save images
//   rand       – per-worker seeded RNGs
//   rayon      – parallel candidate search
//   clap       – CLI arg parsing
//   anyhow     – ergonomic errors
//   log        – progress logging (env_logger backend, RUST_LOG to override)

use anyhow::{Context, Result, bail};
use clap::Parser;
use image::{GenericImageView, imageops::FilterType};
use shape_painter::{
    CommitPolicy, FitnessPolicy, IterationReport, Optimizer, Raster, RunConfig, ShapeKind,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

// ---------------- CLI ---------------------------------------------------------
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Approximate an image with painted shapes", long_about = None)]
struct Args {
    /// Path to the target image
    #[arg(short, long)]
    input: PathBuf,

    /// Path where the final canvas will be written
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Resize the target to this width (px), keeping aspect ratio
    #[arg(short = 'w', long, conflicts_with = "scale")]
    width: Option<u32>,

    /// Scale factor applied to the target before painting
    #[arg(long)]
    scale: Option<f32>,

    /// Primitive to paint with
    #[arg(short = 's', long, value_enum, default_value_t = ShapeKind::Rect)]
    shape: ShapeKind,

    /// Number of iterations (shapes) to run
    #[arg(short = 'n', long, default_value_t = 10_000)]
    iterations: usize,

    /// Candidates sampled per iteration
    #[arg(short = 'b', long, default_value_t = 100)]
    batch_size: usize,

    /// Ceiling on worker threads (default: all cores)
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Largest shape side at the start of the run
    #[arg(long, default_value_t = 200)]
    max_start_size: u32,

    /// Smallest shape side at the end of the run
    #[arg(long, default_value_t = 1)]
    min_end_size: u32,

    /// How candidates are scored
    #[arg(long, value_enum, default_value_t = FitnessPolicy::Total)]
    fitness: FitnessPolicy,

    /// When the best candidate is painted
    #[arg(long, value_enum, default_value_t = CommitPolicy::Always)]
    commit: CommitPolicy,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Initial canvas color as RRGGBB hex
    #[arg(long, default_value = "000000", value_parser = parse_hex_color)]
    background: [u8; 3],

    /// Start from this image instead of a blank canvas (resized to the target)
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Log progress every N iterations
    #[arg(long, default_value_t = 100)]
    report_every: usize,

    /// Write a snapshot of the canvas every N iterations (0 = never)
    #[arg(long, default_value_t = 0)]
    save_every: usize,

    /// Directory for snapshots
    #[arg(long, default_value = "snapshots")]
    snapshot_dir: PathBuf,
}

impl Args {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            iterations: self.iterations,
            batch_size: self.batch_size,
            max_workers: self.workers,
            max_start_size: self.max_start_size,
            min_end_size: self.min_end_size,
            shape: self.shape,
            fitness_policy: self.fitness,
            commit_policy: self.commit,
            seed: self.seed,
            background: self.background,
        }
    }
}

fn parse_hex_color(s: &str) -> std::result::Result<[u8; 3], String> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected RRGGBB, got '{s}'"));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad colour '{s}': {e}"))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

// ---------------- Utility -----------------------------------------------------
fn load_target(path: &Path, width: Option<u32>, scale: Option<f32>) -> Result<Raster> {
    let img = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let (orig_width, orig_height) = img.dimensions();
    let (target_width, target_height) = match (width, scale) {
        (Some(w), _) => {
            let aspect_ratio = orig_height as f32 / orig_width as f32;
            (w, (w as f32 * aspect_ratio).round() as u32)
        }
        (None, Some(s)) => {
            if !(s.is_finite() && s > 0.0) {
                bail!("scale must be a positive number, got {s}");
            }
            (
                (orig_width as f32 * s).round() as u32,
                (orig_height as f32 * s).round() as u32,
            )
        }
        (None, None) => (orig_width, orig_height),
    };
    let img = if (target_width, target_height) == (orig_width, orig_height) {
        img
    } else {
        img.resize_exact(target_width.max(1), target_height.max(1), FilterType::Triangle)
    };
    Ok(Raster::from_image(&img.to_rgb8()))
}

fn save_snapshot(dir: &Path, canvas: &Raster, report: &IterationReport) -> Result<()> {
    let path = dir.join(format!("iter_{:06}.png", report.iteration + 1));
    canvas
        .to_image()
        .save(&path)
        .with_context(|| format!("failed to write snapshot {}", path.display()))
}

// ---------------- MAIN --------------------------------------------------------
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let target = load_target(&args.input, args.width, args.scale)?;
    log::info!("target is {}x{} pixels", target.width(), target.height());

    let (width, height) = target.dimensions();
    let mut optimizer = Optimizer::new(args.run_config(), target)?;
    if let Some(path) = &args.resume {
        let img = image::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?
            .resize_exact(width, height, FilterType::Triangle);
        optimizer = optimizer.with_canvas(Raster::from_image(&img.to_rgb8()))?;
        log::info!("resuming from {}", path.display());
    }
    if args.save_every > 0 {
        fs::create_dir_all(&args.snapshot_dir).with_context(|| {
            format!("failed to create {}", args.snapshot_dir.display())
        })?;
    }

    let started = Instant::now();
    let mut snapshot_error = None;
    optimizer.run(|report, canvas| {
        let n = report.iteration + 1;
        if args.report_every > 0 && n % args.report_every == 0 {
            log::info!(
                "iter {n}: cap {} fitness {:.1} ({:.2?}/iter)",
                report.max_size,
                report.winner.fitness,
                report.elapsed
            );
        }
        if snapshot_error.is_none() && args.save_every > 0 && n % args.save_every == 0 {
            snapshot_error = save_snapshot(&args.snapshot_dir, canvas, report).err();
        }
    })?;
    if let Some(err) = snapshot_error {
        return Err(err);
    }

    optimizer
        .canvas()
        .to_image()
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    let pixels = optimizer.canvas().pixels().len().max(1) as f64;
    println!(
        "Done! {} iterations on {} workers in {:.1?}. MSE per channel: {:.2}. Seed: {}. Output: {}",
        optimizer.iteration(),
        optimizer.workers(),
        started.elapsed(),
        optimizer.total_error()? as f64 / (pixels * 3.0),
        optimizer.seed(),
        args.output.display()
    );
    Ok(())
}
