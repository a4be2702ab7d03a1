use crate::crop::CropTarget;
use crate::error::{PrepError, Result};

/// Digital zoom applied to the sampled region. Always within
/// `[ZoomFactor::MIN, ZoomFactor::MAX]`, never zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ZoomFactor(f64);

impl ZoomFactor {
    pub const MIN: f64 = 0.1;
    pub const MAX: f64 = 3.0;
    pub const DEFAULT: Self = Self(1.0);

    /// Rejects non-positive (and non-finite) values, clamps everything else.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(PrepError::InvalidZoom(value));
        }
        Ok(Self(value.clamp(Self::MIN, Self::MAX)))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    pub fn is_identity(self) -> bool {
        self.0 == 1.0
    }
}

impl Default for ZoomFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Size of the region read from the original image for `target` at `zoom`.
///
/// Higher zoom samples a smaller region; the output is still resampled to
/// the full target size. Either dimension may floor to zero for tiny targets,
/// [`crate::crop::resolve`] raises it back to one pixel.
pub fn effective_sample_size(target: CropTarget, zoom: ZoomFactor) -> (u32, u32) {
    let scale = |dim: u32| (dim as f64 / zoom.get()).floor() as u32;
    (scale(target.width), scale(target.height))
}
