use anyhow::{Context, bail};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use junction_watch::clock::{Clock, SystemClock};
use junction_watch::core_modules::camera_feed::CameraFeed;
use junction_watch::core_modules::utils::frame_helper::frame_helper::save_png;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SHEET_COLUMNS: u32 = 4;
const SHEET_ROWS: u32 = 2;
const THUMB_SCALE: u32 = 4;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: feed_tester <output_dir> [frame_count] [stride]");
        return Ok(());
    }
    let output_dir = PathBuf::from(&args[1]);
    let frame_count: u64 = match args.get(2) {
        Some(raw) => raw.parse().with_context(|| format!("frame_count `{raw}` is not a number"))?,
        None => 120,
    };
    let stride: u64 = match args.get(3) {
        Some(raw) => raw.parse().with_context(|| format!("stride `{raw}` is not a number"))?,
        None => 15,
    };
    if stride == 0 {
        bail!("stride must be at least 1");
    }
    std::fs::create_dir_all(&output_dir).with_context(|| format!("creating {}", output_dir.display()))?;

    // --- 2. Feed Initialization ---
    let mut feed = CameraFeed::new();
    let clock = SystemClock;
    let thumb_w = feed.width() / THUMB_SCALE;
    let thumb_h = feed.height() / THUMB_SCALE;
    let mut sheet = RgbImage::from_pixel(thumb_w * SHEET_COLUMNS, thumb_h * SHEET_ROWS, Rgb([0, 0, 0]));
    let mut thumbs = 0u32;

    // --- 3. Main Rendering Loop ---
    for index in 0..frame_count {
        feed.step();
        if index % stride != 0 {
            continue;
        }

        let frame = feed.render(&clock.time_label());
        let path = output_dir.join(format!("frame_{index:05}.png"));
        save_png(&path, &frame).with_context(|| format!("writing {}", path.display()))?;
        info!(frame = index, path = %path.display(), detected = feed.detected_count(), "frame written");

        // --- 4. Contact Sheet ---
        if thumbs < SHEET_COLUMNS * SHEET_ROWS {
            let thumb = imageops::resize(&frame, thumb_w, thumb_h, FilterType::Triangle);
            let (col, row) = (thumbs % SHEET_COLUMNS, thumbs / SHEET_COLUMNS);
            imageops::replace(&mut sheet, &thumb, (col * thumb_w) as i64, (row * thumb_h) as i64);
            thumbs += 1;
        }
    }

    if thumbs == 0 {
        warn!("no frames rendered, skipping contact sheet");
        return Ok(());
    }
    let sheet_path = output_dir.join("contact_sheet.png");
    save_png(&sheet_path, &sheet).with_context(|| format!("writing {}", sheet_path.display()))?;
    info!(path = %sheet_path.display(), thumbnails = thumbs, "contact sheet written");
    Ok(())
}
