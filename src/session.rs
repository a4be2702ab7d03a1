use std::path::{Path, PathBuf};

use crate::{
    crop::{self, CropChoice, CropRectangle, CropTarget},
    display::{DisplayPreset, DisplaySpec, DisplayTransform},
    error::{PrepError, Result},
    zoom::{effective_sample_size, ZoomFactor},
};

/// One loaded source image and its intrinsic pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    path: PathBuf,
    dimensions: (u32, u32),
}

impl ImageRef {
    pub fn new(path: impl Into<PathBuf>, dimensions: (u32, u32)) -> Self {
        Self {
            path: path.into(),
            dimensions,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// File name without extension, used to name saved crops.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Browsing state of a single cropping session.
///
/// The session is `Empty` until a non-empty batch is loaded, afterwards there
/// is always exactly one active image. Zoom is reset whenever the active image
/// changes; target and display settings persist across images. Every mutator
/// validates first and only then commits.
#[derive(Debug, Clone)]
pub struct SessionState {
    images: Vec<ImageRef>,
    current: Option<usize>,
    zoom: ZoomFactor,
    target: CropTarget,
    display: DisplaySpec,
}

impl SessionState {
    pub fn new(target: CropTarget, display: DisplaySpec) -> Self {
        Self {
            images: Vec::new(),
            current: None,
            zoom: ZoomFactor::DEFAULT,
            target,
            display,
        }
    }

    /// Replaces the image list, activating the first image if there is one.
    pub fn load(&mut self, images: Vec<ImageRef>) -> usize {
        self.current = if images.is_empty() { None } else { Some(0) };
        self.images = images;
        self.zoom = ZoomFactor::DEFAULT;
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&ImageRef> {
        self.current.and_then(|idx| self.images.get(idx))
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.images.len() {
            return Err(PrepError::IndexOutOfRange {
                index,
                len: self.images.len(),
            });
        }
        self.current = Some(index);
        self.zoom = ZoomFactor::DEFAULT;
        Ok(())
    }

    /// Moves to the neighbouring image, wrapping at both ends.
    pub fn navigate(&mut self, direction: Direction) -> Result<usize> {
        let current = self.current.ok_or(PrepError::EmptySession)?;
        let len = self.images.len();
        let next = match direction {
            Direction::Next => (current + 1) % len,
            Direction::Prev => (current + len - 1) % len,
        };
        self.current = Some(next);
        self.zoom = ZoomFactor::DEFAULT;
        Ok(next)
    }

    pub fn zoom(&self) -> ZoomFactor {
        self.zoom
    }

    pub fn set_zoom(&mut self, value: f64) -> Result<ZoomFactor> {
        self.zoom = ZoomFactor::new(value)?;
        Ok(self.zoom)
    }

    pub fn crop_target(&self) -> CropTarget {
        self.target
    }

    pub fn set_crop_target(&mut self, choice: CropChoice) -> Result<CropTarget> {
        self.target = CropTarget::from_choice(choice)?;
        Ok(self.target)
    }

    pub fn display(&self) -> DisplaySpec {
        self.display
    }

    pub fn set_display(&mut self, display: DisplaySpec) {
        self.display = display;
    }

    /// Preview geometry of the active image under the current display spec.
    pub fn display_transform(&self) -> Result<DisplayTransform> {
        let image = self.current().ok_or(PrepError::EmptySession)?;
        Ok(DisplayTransform::compute(image.dimensions(), self.display))
    }

    pub fn sample_size(&self) -> (u32, u32) {
        effective_sample_size(self.target, self.zoom)
    }

    /// Resolves a click on the active image's preview into an original-image
    /// crop rectangle using the current zoom and target.
    pub fn resolve_click(&self, click: (f64, f64)) -> Result<CropRectangle> {
        let image = self.current().ok_or(PrepError::EmptySession)?;
        let transform = DisplayTransform::compute(image.dimensions(), self.display);
        let rect = crop::resolve(click, &transform, image.dimensions(), self.sample_size())?;
        log::debug!(
            "click ({:.1}, {:.1}) on {} resolved to {:?}",
            click.0,
            click.1,
            image.path().display(),
            rect
        );
        Ok(rect)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(CropTarget::default(), DisplayPreset::default().spec())
    }
}
