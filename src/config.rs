use std::path::PathBuf;

use crate::{
    crop::CropTarget,
    display::DisplayPreset,
    image_utils::{OutputFormat, ResampleFilter},
    session::SessionState,
};

pub const DEFAULT_OUTPUT_DIR: &str = "crops";
pub const DEFAULT_QUALITY: u8 = 90;

/// Everything an interactive cropping session is configured with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub display: DisplayPreset,
    pub target: CropTarget,
    pub filter: ResampleFilter,
    pub format: OutputFormat,
    pub quality: u8,
}

impl Settings {
    /// Fresh, empty session using these defaults.
    pub fn session(&self) -> SessionState {
        SessionState::new(self.target, self.display.spec())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            display: DisplayPreset::default(),
            target: CropTarget::default(),
            filter: ResampleFilter::default(),
            format: OutputFormat::default(),
            quality: DEFAULT_QUALITY,
        }
    }
}
