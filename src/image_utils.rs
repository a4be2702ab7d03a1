use std::{
    fs::File,
    io::{BufWriter, Cursor},
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use eframe::egui;
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{codecs::avif::AvifEncoder, DynamicImage, ImageError};
use zune_jpeg::JpegDecoder;

use crate::{
    crop::{CropRectangle, CropTarget},
    error::{PrepError, Result},
    session::ImageRef,
};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
    Webp,
    Avif,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Webp => "webp",
            OutputFormat::Avif => "avif",
        }
    }
}

/// Interpolation used when resampling crops and previews.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum ResampleFilter {
    #[default]
    Lanczos3,
    CatmullRom,
    Bilinear,
    Nearest,
}

impl ResampleFilter {
    fn resize_alg(self) -> ResizeAlg {
        match self {
            ResampleFilter::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
            ResampleFilter::CatmullRom => ResizeAlg::Convolution(FilterType::CatmullRom),
            ResampleFilter::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            ResampleFilter::Nearest => ResizeAlg::Nearest,
        }
    }
}

fn decode_error(path: &Path, source: ImageError) -> PrepError {
    PrepError::ImageDecode {
        path: path.to_path_buf(),
        source,
    }
}

/// Fully decodes an image file. JPEGs go through zune-jpeg first and fall
/// back to the `image` decoders if that fails.
pub fn decode_image(path: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(path).map_err(|e| decode_error(path, ImageError::IoError(e)))?;

    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.eq_ignore_ascii_case("jpg") || s.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false);

    if is_jpeg {
        if let Some(image) = decode_jpeg_fast(&bytes) {
            return Ok(image);
        }
    }
    image::load_from_memory(&bytes).map_err(|e| decode_error(path, e))
}

fn decode_jpeg_fast(bytes: &[u8]) -> Option<DynamicImage> {
    let mut decoder = JpegDecoder::new(Cursor::new(bytes));
    let pixels = decoder.decode().ok()?;
    let info = decoder.info()?;
    // Grayscale or CMYK output does not fit an RGB buffer; from_raw rejects it.
    image::RgbImage::from_raw(info.width as u32, info.height as u32, pixels)
        .map(DynamicImage::ImageRgb8)
}

/// Reads only the header to learn an image's pixel size.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32)> {
    let (width, height) = image::image_dimensions(path).map_err(|e| decode_error(path, e))?;
    if width == 0 || height == 0 {
        return Err(PrepError::InvalidImage);
    }
    Ok((width, height))
}

/// Builds session entries for `paths`, skipping files whose header cannot be
/// read. The skipped paths are returned alongside the reason.
pub fn probe_images(paths: Vec<PathBuf>) -> (Vec<ImageRef>, Vec<(PathBuf, PrepError)>) {
    let mut images = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();
    for path in paths {
        match probe_dimensions(&path) {
            Ok(dimensions) => images.push(ImageRef::new(path, dimensions)),
            Err(err) => {
                log::warn!("Skipping {}: {err}", path.display());
                skipped.push((path, err));
            }
        }
    }
    (images, skipped)
}

/// Resizes to exactly `size`, ignoring aspect ratio.
pub fn resize_exact(image: &DynamicImage, size: (u32, u32), filter: ResampleFilter) -> Result<DynamicImage> {
    let (width, height) = size;
    if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
        return Err(PrepError::InvalidImage);
    }
    if image.width() == width && image.height() == height {
        return Ok(image.clone());
    }

    let has_alpha = image.color().has_alpha();
    let (buffer, pixel_type) = if has_alpha {
        (image.to_rgba8().into_raw(), PixelType::U8x4)
    } else {
        (image.to_rgb8().into_raw(), PixelType::U8x3)
    };
    let src_image = Image::from_vec_u8(image.width(), image.height(), buffer, pixel_type)
        .map_err(|e| PrepError::Resample(e.to_string()))?;
    let mut dst_image = Image::new(width, height, pixel_type);
    Resizer::new()
        .resize(
            &src_image,
            &mut dst_image,
            &ResizeOptions::new().resize_alg(filter.resize_alg()),
        )
        .map_err(|e| PrepError::Resample(e.to_string()))?;

    let pixels = dst_image.into_vec();
    let resized = if has_alpha {
        image::RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
    } else {
        image::RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
    };
    resized.ok_or_else(|| PrepError::Resample("resized buffer has unexpected length".into()))
}

/// Cuts `rect` out of the full-resolution image and resamples it to the
/// target size. The output is always `target` sized whatever the rectangle.
pub fn resample_crop(
    image: &DynamicImage,
    rect: CropRectangle,
    target: CropTarget,
    filter: ResampleFilter,
) -> Result<DynamicImage> {
    if !rect.fits_within((image.width(), image.height())) {
        return Err(PrepError::InvalidImage);
    }
    let (x, y, w, h) = rect.to_u32_bounds();
    let region = image.crop_imm(x, y, w, h);
    resize_exact(&region, target.dimensions(), filter)
}

/// Downscales the original to its on-screen preview size.
pub fn make_preview(image: &DynamicImage, display_size: (u32, u32)) -> Result<DynamicImage> {
    resize_exact(image, display_size, ResampleFilter::Lanczos3)
}

/// Encodes `image` into `path` in the requested format.
pub fn write_image(image: &DynamicImage, path: &Path, format: OutputFormat, quality: u8) -> std::result::Result<(), ImageError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    match format {
        OutputFormat::Jpg => {
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)
        }
        OutputFormat::Png => {
            let encoder = image::codecs::png::PngEncoder::new(writer);
            image.write_with_encoder(encoder)
        }
        OutputFormat::Webp => {
            let encoder = image::codecs::webp::WebPEncoder::new_lossless(writer);
            DynamicImage::ImageRgba8(image.to_rgba8()).write_with_encoder(encoder)
        }
        OutputFormat::Avif => {
            let encoder = AvifEncoder::new_with_speed_quality(writer, 4, quality);
            image.write_with_encoder(encoder)
        }
    }
}

pub fn to_color_image(img: &DynamicImage) -> egui::ColorImage {
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels = rgba.into_raw();
    egui::ColorImage::from_rgba_unmultiplied(size, &pixels)
}
