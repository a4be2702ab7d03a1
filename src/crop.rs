use std::fmt;

use clap::ValueEnum;

use crate::display::DisplayTransform;
use crate::error::{PrepError, Result};

/// Largest side accepted for a custom target. Crops are uploaded as
/// textures, and 8192 is the smallest max texture side wgpu guarantees.
pub const MAX_TARGET_SIDE: u32 = 8192;

/// Fixed output sizes offered to the user.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum CropPreset {
    #[default]
    #[value(name = "512x512")]
    Square512,
    #[value(name = "768x768")]
    Square768,
    #[value(name = "1024x1024")]
    Square1024,
    #[value(name = "2048x2048")]
    Square2048,
    #[value(name = "512x768")]
    Portrait512x768,
    #[value(name = "768x512")]
    Landscape768x512,
}

impl CropPreset {
    pub const ALL: [Self; 6] = [
        Self::Square512,
        Self::Square768,
        Self::Square1024,
        Self::Square2048,
        Self::Portrait512x768,
        Self::Landscape768x512,
    ];

    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Square512 => (512, 512),
            Self::Square768 => (768, 768),
            Self::Square1024 => (1024, 1024),
            Self::Square2048 => (2048, 2048),
            Self::Portrait512x768 => (512, 768),
            Self::Landscape768x512 => (768, 512),
        }
    }

    pub fn label(self) -> String {
        let (w, h) = self.dimensions();
        format!("{w}x{h}")
    }
}

/// What the user picked: a preset or raw custom input that still needs
/// validating before it becomes the session's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropChoice {
    Preset(CropPreset),
    Custom { width: i64, height: i64 },
}

/// Output dimensions every crop is resampled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropTarget {
    pub width: u32,
    pub height: u32,
}

impl CropTarget {
    pub fn custom(width: i64, height: i64) -> Result<Self> {
        let max = MAX_TARGET_SIDE as i64;
        if !(1..=max).contains(&width) || !(1..=max).contains(&height) {
            return Err(PrepError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn from_choice(choice: CropChoice) -> Result<Self> {
        match choice {
            CropChoice::Preset(preset) => Ok(preset.into()),
            CropChoice::Custom { width, height } => Self::custom(width, height),
        }
    }

    pub fn dimensions(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl From<CropPreset> for CropTarget {
    fn from(preset: CropPreset) -> Self {
        let (width, height) = preset.dimensions();
        Self { width, height }
    }
}

impl Default for CropTarget {
    fn default() -> Self {
        CropPreset::default().into()
    }
}

impl fmt::Display for CropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned region in original-image pixels. Always non-empty and
/// fully inside the image it was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRectangle {
    pub fn to_u32_bounds(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.width, self.height)
    }

    pub fn fits_within(&self, size: (u32, u32)) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= size.0 as u64
            && self.y as u64 + self.height as u64 <= size.1 as u64
    }
}

/// Turns a click on the preview into the region of the original image to
/// sample.
///
/// The click is mapped through `transform`, the `sample` rectangle is centred
/// on it and then pushed back inside the image. A sample larger than the
/// image shrinks to the image. Clicks off the preview are treated as `(0, 0)`.
///
/// # Errors
///
/// Returns [`PrepError::InvalidImage`] if `original_size` has a zero side.
pub fn resolve(
    click: (f64, f64),
    transform: &DisplayTransform,
    original_size: (u32, u32),
    sample: (u32, u32),
) -> Result<CropRectangle> {
    let (image_w, image_h) = original_size;
    if image_w == 0 || image_h == 0 {
        return Err(PrepError::InvalidImage);
    }

    let click = if transform.contains(click) {
        click
    } else {
        (0.0, 0.0)
    };
    let (ox, oy) = transform.to_original(click);

    let (x, width) = place_axis(ox.floor() as i64, sample.0.max(1), image_w);
    let (y, height) = place_axis(oy.floor() as i64, sample.1.max(1), image_h);
    Ok(CropRectangle {
        x,
        y,
        width,
        height,
    })
}

/// Centres a span of `len` on `center` and clamps it into `[0, limit)`.
fn place_axis(center: i64, len: u32, limit: u32) -> (u32, u32) {
    if len >= limit {
        return (0, limit);
    }
    let start = (center - (len / 2) as i64).clamp(0, (limit - len) as i64);
    (start as u32, len)
}
