use std::{
    fs::File,
    io::{self, BufWriter},
    path::Path,
};

use anyhow::{bail, Context, Result};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::store::{CropStore, OutputDir};

pub const DEFAULT_ARCHIVE_NAME: &str = "cropped_images.zip";

/// Packs every saved crop into a zip at `destination`. Returns how many
/// files went in.
pub fn export_zip(output: &OutputDir, destination: &Path) -> Result<usize> {
    let ids = output
        .list()
        .with_context(|| format!("Unable to list {}", output.dir().display()))?;
    if ids.is_empty() {
        bail!("No crops to download");
    }

    let file = File::create(destination)
        .with_context(|| format!("Unable to create {}", destination.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for id in &ids {
        zip.start_file(id.as_str(), options)
            .with_context(|| format!("Unable to add {id} to archive"))?;
        let mut source = File::open(output.path_of(id))
            .with_context(|| format!("Unable to read {id}"))?;
        io::copy(&mut source, &mut zip).with_context(|| format!("Unable to add {id} to archive"))?;
    }
    zip.finish()
        .with_context(|| format!("Unable to finish {}", destination.display()))?;

    log::info!("Created {} with {} images", destination.display(), ids.len());
    Ok(ids.len())
}
