use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrepError>;

/// Failures raised by the crop engine, the session and the output store.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("image has zero width or height")]
    InvalidImage,

    #[error("zoom must be a positive number, got {0}")]
    InvalidZoom(f64),

    #[error("crop dimensions must be at least 1x1, got {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("index {index} is out of range for {len} images")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no images loaded")]
    EmptySession,

    #[error("unable to decode {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("resampling failed: {0}")]
    Resample(String),

    #[error("unable to write {id}: {source}")]
    StoreWrite {
        id: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unable to delete {id}: {source}")]
    StoreDelete {
        id: String,
        #[source]
        source: std::io::Error,
    },
}
