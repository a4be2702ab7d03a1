//! Dataset clean-up passes run over a directory before cropping.
//!
//! Both passes work file by file and keep going when one file fails, so a
//! single bad image never aborts the batch. Run [`scan_corrupt`] first: there
//! is no point normalising files that are about to be quarantined.

use std::path::{Path, PathBuf};

use anyhow::Result;
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};

use crate::{
    fs_utils::{caption_for, collect_images, move_with_unique_name, prepare_dir},
    image_utils::decode_image,
};

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of images examined.
    pub processed: usize,
    /// Files that were moved or rewritten.
    pub changed: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn summary(&self) -> String {
        format!(
            "{} processed, {} changed, {} failed",
            self.processed,
            self.changed.len(),
            self.failures.len()
        )
    }
}

/// Decodes every image under `source` and moves the ones that fail, plus
/// their caption file, into `quarantine`. Files already inside `quarantine`
/// are left alone.
pub fn scan_corrupt(source: &Path, quarantine: &Path) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    // Compare resolved paths so `./x` and `a/../x` spellings still match.
    let quarantine_root = resolved(quarantine);
    let files: Vec<PathBuf> = collect_images(source, true)?
        .into_iter()
        .filter(|path| !resolved(path).starts_with(&quarantine_root))
        .collect();

    for path in files {
        report.processed += 1;
        let Err(err) = decode_image(&path) else {
            continue;
        };
        log::warn!("Moving corrupted/truncated image {}: {err}", path.display());
        let caption = caption_for(&path);
        let moved = prepare_dir(quarantine).and_then(|dir| move_with_unique_name(&path, &dir));
        match moved {
            Ok(destination) => report.changed.push(destination),
            Err(err) => {
                report.failures.push((path, format!("{err:#}")));
                continue;
            }
        }
        if let Some(caption) = caption {
            if let Err(err) = move_with_unique_name(&caption, quarantine) {
                report.failures.push((caption, format!("{err:#}")));
            }
        }
    }
    Ok(report)
}

fn resolved(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Rewrites every non-RGB image directly inside `dir` as 8-bit RGB, in place.
pub fn normalize_rgb(dir: &Path) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    for path in collect_images(dir, false)? {
        report.processed += 1;
        let image = match decode_image(&path) {
            Ok(image) => image,
            Err(err) => {
                log::warn!("{err}");
                report.failures.push((path, err.to_string()));
                continue;
            }
        };
        let Some(rgb) = flatten_to_rgb(&image) else {
            continue;
        };
        match DynamicImage::ImageRgb8(rgb).save(&path) {
            Ok(()) => {
                log::info!("Converted {} from {:?} to RGB", path.display(), image.color());
                report.changed.push(path);
            }
            Err(err) => report.failures.push((path, err.to_string())),
        }
    }
    Ok(report)
}

/// RGB version of `image`, or `None` if it already is 8-bit RGB. Alpha is
/// composited onto white.
pub fn flatten_to_rgb(image: &DynamicImage) -> Option<RgbImage> {
    match image {
        DynamicImage::ImageRgb8(_) => None,
        other if other.color().has_alpha() => Some(composite_on_white(&other.to_rgba8())),
        other => Some(other.to_rgb8()),
    }
}

pub fn composite_on_white(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}
