use clap::ValueEnum;

/// Largest preview ever uploaded as a texture. `Original` previews of bigger
/// images are shrunk to fit.
pub const MAX_PREVIEW_SIZE: (u32, u32) = (3840, 2160);

/// Bounding box a preview is fitted into, or the intrinsic size unscaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplaySpec {
    Bounded { max_width: u32, max_height: u32 },
    Original,
}

/// Named display sizes offered to the user.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum DisplayPreset {
    Small,
    #[default]
    Medium,
    Large,
    XLarge,
    Original,
}

impl DisplayPreset {
    pub const ALL: [Self; 5] = [
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::XLarge,
        Self::Original,
    ];

    pub fn spec(self) -> DisplaySpec {
        match self {
            Self::Small => DisplaySpec::Bounded { max_width: 600, max_height: 480 },
            Self::Medium => DisplaySpec::Bounded { max_width: 800, max_height: 600 },
            Self::Large => DisplaySpec::Bounded { max_width: 1000, max_height: 750 },
            Self::XLarge => DisplaySpec::Bounded { max_width: 1200, max_height: 900 },
            Self::Original => DisplaySpec::Original,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "Small (600x480)",
            Self::Medium => "Medium (800x600)",
            Self::Large => "Large (1000x750)",
            Self::XLarge => "X-Large (1200x900)",
            Self::Original => "Original Size",
        }
    }
}

/// Relationship between an original image and its on-screen preview.
///
/// `scale_x`/`scale_y` map display pixels back to original pixels, i.e. they
/// are the inverse of the factor used to shrink the preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub original_size: (u32, u32),
    pub display_size: (u32, u32),
    pub scale_x: f64,
    pub scale_y: f64,
}

impl DisplayTransform {
    pub fn compute(original_size: (u32, u32), spec: DisplaySpec) -> Self {
        let (width, height) = (original_size.0.max(1), original_size.1.max(1));
        let display_size = match spec {
            DisplaySpec::Original => fit_within((width, height), MAX_PREVIEW_SIZE),
            DisplaySpec::Bounded {
                max_width,
                max_height,
            } => fit_within((width, height), (max_width.max(1), max_height.max(1))),
        };
        Self {
            original_size: (width, height),
            display_size,
            scale_x: width as f64 / display_size.0 as f64,
            scale_y: height as f64 / display_size.1 as f64,
        }
    }

    /// Whether a display-space point lies on the preview.
    pub fn contains(&self, point: (f64, f64)) -> bool {
        let (x, y) = point;
        x >= 0.0
            && y >= 0.0
            && x < self.display_size.0 as f64
            && y < self.display_size.1 as f64
    }

    pub fn to_original(&self, point: (f64, f64)) -> (f64, f64) {
        (point.0 * self.scale_x, point.1 * self.scale_y)
    }

    pub fn is_scaled(&self) -> bool {
        self.display_size != self.original_size
    }
}

/// Shrinks `size` to fit inside `bounds` keeping its aspect ratio. Images that
/// already fit are left at their native size.
pub fn fit_within(size: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (width, height) = size;
    if width <= bounds.0 && height <= bounds.1 {
        return size;
    }
    let factor = (bounds.0 as f64 / width as f64).min(bounds.1 as f64 / height as f64);
    let fitted_w = ((width as f64 * factor).round() as u32).clamp(1, bounds.0);
    let fitted_h = ((height as f64 * factor).round() as u32).clamp(1, bounds.1);
    (fitted_w, fitted_h)
}
