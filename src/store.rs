use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Result as AnyResult;
use image::DynamicImage;

use crate::{
    error::{PrepError, Result},
    fs_utils::{has_extension, prepare_dir, split_name},
    image_utils::{write_image, OutputFormat},
};

/// Extensions enumerated as saved crops.
pub const OUTPUT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "avif"];

/// Append-only collection of saved crops, addressed by identifier.
pub trait CropStore {
    /// Identifiers of every saved crop, sorted.
    fn list(&self) -> io::Result<Vec<String>>;

    /// Persists a crop derived from the image named `source_stem` and returns
    /// its new identifier.
    fn write(&mut self, source_stem: &str, image: &DynamicImage) -> Result<String>;

    fn delete(&mut self, id: &str) -> Result<()>;
}

/// Name for the next crop of `source_stem`: `{stem}_crop_{n}`.
///
/// `n` starts at one past the number of existing crops of that source and
/// skips any name still in use, so deleting an early crop never makes a new
/// one overwrite a later one.
pub fn crop_file_stem(source_stem: &str, existing: &[String]) -> String {
    let prefix = format!("{source_stem}_crop_");
    let stems: Vec<String> = existing
        .iter()
        .map(|name| split_name(OsStr::new(name)).0)
        .collect();
    let mut n = stems.iter().filter(|s| s.starts_with(&prefix)).count() + 1;
    loop {
        let candidate = format!("{prefix}{n}");
        if !stems.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Crops stored as image files in one directory; the identifier is the file
/// name.
pub struct OutputDir {
    dir: PathBuf,
    format: OutputFormat,
    quality: u8,
}

impl OutputDir {
    pub fn open(dir: &Path, format: OutputFormat, quality: u8) -> AnyResult<Self> {
        let dir = prepare_dir(dir)?;
        Ok(Self {
            dir,
            format,
            quality,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, id: &str) -> PathBuf {
        self.dir.join(id)
    }
}

fn validate_id(id: &str) -> io::Result<()> {
    let plain = Path::new(id).file_name().map(|n| n == id).unwrap_or(false);
    if plain {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{id:?} is not a crop file name"),
        ))
    }
}

impl CropStore for OutputDir {
    fn list(&self) -> io::Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || !has_extension(&path, OUTPUT_EXTENSIONS) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                ids.push(name.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn write(&mut self, source_stem: &str, image: &DynamicImage) -> Result<String> {
        let write_error = |id: &str, source: Box<dyn std::error::Error + Send + Sync>| PrepError::StoreWrite {
            id: id.to_string(),
            source,
        };

        let existing = self.list().map_err(|e| write_error(source_stem, e.into()))?;
        let id = format!(
            "{}.{}",
            crop_file_stem(source_stem, &existing),
            self.format.extension()
        );

        // Encode next to the target and rename so a failed write never
        // leaves a truncated crop behind.
        let temp_path = self.dir.join(format!(".{id}.tmp"));
        let final_path = self.path_of(&id);
        let result = write_image(image, &temp_path, self.format, self.quality)
            .map_err(|e| write_error(id.as_str(), e.into()))
            .and_then(|_| fs::rename(&temp_path, &final_path).map_err(|e| write_error(id.as_str(), e.into())));
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result?;

        log::info!("Saved crop {}", final_path.display());
        Ok(id)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        validate_id(id)
            .and_then(|_| fs::remove_file(self.path_of(id)))
            .map_err(|source| PrepError::StoreDelete {
                id: id.to_string(),
                source,
            })
    }
}
