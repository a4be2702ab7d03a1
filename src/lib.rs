pub mod app;
pub mod archive;
pub mod batch;
pub mod config;
pub mod crop;
pub mod display;
pub mod error;
pub mod fs_utils;
pub mod image_utils;
pub mod selection;
pub mod session;
pub mod store;
pub mod zoom;

pub use error::{PrepError, Result};
