//! Resize-and-recompress pipeline for the page background.

use image::{DynamicImage, GenericImageView, imageops::FilterType};
use jpeg_encoder::{ColorType, Encoder};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::{
    Error, Result,
    config::{ExportConfig, ExportTarget},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Width capped at `max_width` without ever upscaling, height kept proportional.
pub fn fit_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, scaled.max(1))
}

pub fn resize_to_width(source: &DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = source.dimensions();
    let (out_w, out_h) = fit_width(width, height, max_width);
    if (out_w, out_h) == (width, height) {
        return source.clone();
    }
    source.resize_exact(out_w, out_h, FilterType::Lanczos3)
}

pub fn encode_jpeg(image: &DynamicImage, target: &ExportTarget) -> Result<()> {
    let (width, height) = image.dimensions();
    let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(Error::ImageTooLarge { width, height }),
    };
    if let Some(parent) = target.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let rgb = image.to_rgb8();
    let mut encoder = Encoder::new_file(&target.path, target.quality)?;
    encoder.set_progressive(target.progressive);
    encoder.set_optimized_huffman_tables(true);
    encoder.encode(rgb.as_raw(), w, h, ColorType::Rgb)?;
    Ok(())
}

pub fn export_target(source: &DynamicImage, target: &ExportTarget) -> Result<ExportedImage> {
    let resized = resize_to_width(source, target.max_width);
    encode_jpeg(&resized, target)?;
    let (width, height) = resized.dimensions();
    info!(
        "Wrote {} ({}x{}, quality {})",
        target.path.display(),
        width,
        height,
        target.quality
    );
    Ok(ExportedImage {
        path: target.path.clone(),
        width,
        height,
    })
}

/// Writes every target in order, stopping at the first failure.
///
/// Files written before the failure are left in place.
pub fn run(config: &ExportConfig) -> Result<Vec<ExportedImage>> {
    let result = run_inner(&config.input, &config.targets);
    if let Err(e) = &result {
        error!("Error optimizing images: {}", e);
    }
    result
}

fn run_inner(input: &Path, targets: &[ExportTarget]) -> Result<Vec<ExportedImage>> {
    let source = image::open(input)?;
    let (width, height) = source.dimensions();
    info!("Loaded {} ({}x{})", input.display(), width, height);

    let mut written = Vec::with_capacity(targets.len());
    for target in targets {
        written.push(export_target(&source, target)?);
    }
    Ok(written)
}
