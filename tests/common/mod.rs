#![allow(dead_code)]

use image::{DynamicImage, Rgba, RgbaImage};
use std::path::PathBuf;

use imageprep::session::ImageRef;

pub fn solid_image(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    let pixel = Rgba(color);
    let buffer = RgbaImage::from_pixel(width, height, pixel);
    DynamicImage::ImageRgba8(buffer)
}

pub fn write_image(path: impl Into<PathBuf>, image: &DynamicImage) {
    image
        .save(path.into())
        .expect("failed to write image to disk");
}

pub fn image_refs(sizes: &[(u32, u32)]) -> Vec<ImageRef> {
    sizes
        .iter()
        .enumerate()
        .map(|(idx, size)| ImageRef::new(format!("img{idx}.png"), *size))
        .collect()
}
