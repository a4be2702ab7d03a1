use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use eframe::egui;
use rand::seq::SliceRandom;

use imageprep::app::ImagePrepApp;
use imageprep::archive::{export_zip, DEFAULT_ARCHIVE_NAME};
use imageprep::batch::{normalize_rgb, scan_corrupt};
use imageprep::config::{Settings, DEFAULT_OUTPUT_DIR, DEFAULT_QUALITY};
use imageprep::crop::{CropPreset, CropTarget, MAX_TARGET_SIDE};
use imageprep::display::DisplayPreset;
use imageprep::fs_utils::{collect_images, QUARANTINE_DIR, SUPPORTED_EXTENSIONS};
use imageprep::image_utils::{probe_images, OutputFormat, ResampleFilter};
use imageprep::store::OutputDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum SortOrder {
    Filename,
    Randomize,
    Modified,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Click-to-crop preparation of fixed-size image datasets"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse images and save fixed-size crops centred where you click
    Crop(CropArgs),
    /// Move undecodable images and their caption files into a quarantine directory
    Scan {
        /// Directory to scan recursively
        #[arg(value_name = "DIRECTORY")]
        directory: PathBuf,

        /// Where corrupted files go (defaults to DIRECTORY/TruncatedImages)
        #[arg(short, long)]
        quarantine: Option<PathBuf>,
    },
    /// Convert grayscale and transparent images to RGB in place
    Normalize {
        #[arg(value_name = "DIRECTORY")]
        directory: PathBuf,
    },
    /// Zip every saved crop into one archive
    Export {
        /// Directory holding the saved crops
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Archive to create
        #[arg(value_name = "ARCHIVE", default_value = DEFAULT_ARCHIVE_NAME)]
        archive: PathBuf,
    },
}

#[derive(Args, Debug)]
struct CropArgs {
    /// Directory that contains images to process
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,

    /// Directory saved crops are written to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Size of the preview the crop point is picked on
    #[arg(long, value_enum, default_value_t = DisplayPreset::Medium)]
    display: DisplayPreset,

    /// Output size of every crop
    #[arg(short, long, value_enum, default_value_t = CropPreset::Square512)]
    preset: CropPreset,

    /// Custom output width (overrides the preset, needs --height)
    #[arg(long, requires = "height", value_parser = clap::value_parser!(i64).range(1..=MAX_TARGET_SIDE as i64))]
    width: Option<i64>,

    /// Custom output height (overrides the preset, needs --width)
    #[arg(long, requires = "width", value_parser = clap::value_parser!(i64).range(1..=MAX_TARGET_SIDE as i64))]
    height: Option<i64>,

    /// Resampling filter used when scaling crops to the output size
    #[arg(long, value_enum, default_value_t = ResampleFilter::Lanczos3)]
    filter: ResampleFilter,

    /// Output format for saved crops
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Png)]
    format: OutputFormat,

    /// Quality of lossy output formats (1-100)
    #[arg(short, long, default_value_t = DEFAULT_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Recurse into subdirectories to find images (disabled by default)
    #[arg(short = 'r', long = "recursive", default_value_t = false)]
    recursive: bool,

    /// Invert order of processed images (ignored for randomize)
    #[arg(short = 'i', long = "inverse-order", default_value_t = false)]
    inverse: bool,

    /// Order in which images are processed
    #[arg(long, value_enum, default_value_t = SortOrder::Filename)]
    order: SortOrder,
}

impl CropArgs {
    fn settings(&self) -> Result<Settings> {
        let target = match (self.width, self.height) {
            (Some(width), Some(height)) => CropTarget::custom(width, height)?,
            _ => self.preset.into(),
        };
        Ok(Settings {
            output_dir: self.output.clone(),
            display: self.display,
            target,
            filter: self.filter,
            format: self.format,
            quality: self.quality,
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Crop(args) => run_crop(args),
        Command::Scan {
            directory,
            quarantine,
        } => {
            let quarantine = quarantine.unwrap_or_else(|| directory.join(QUARANTINE_DIR));
            let report = scan_corrupt(&directory, &quarantine)?;
            for (path, reason) in &report.failures {
                log::error!("{}: {reason}", path.display());
            }
            log::info!("Scan finished: {}", report.summary());
            Ok(())
        }
        Command::Normalize { directory } => {
            let report = normalize_rgb(&directory)?;
            for (path, reason) in &report.failures {
                log::error!("{}: {reason}", path.display());
            }
            log::info!("Normalization finished: {}", report.summary());
            Ok(())
        }
        Command::Export { output, archive } => {
            let store = OutputDir::open(&output, OutputFormat::default(), DEFAULT_QUALITY)?;
            let count = export_zip(&store, &archive)?;
            println!("Created {} with {count} images", archive.display());
            Ok(())
        }
    }
}

fn run_crop(args: CropArgs) -> Result<()> {
    let settings = args.settings()?;
    let mut files = collect_images(&args.directory, args.recursive)?;
    match args.order {
        SortOrder::Filename => files.sort(),
        SortOrder::Randomize => files.shuffle(&mut rand::thread_rng()),
        SortOrder::Modified => files.sort_by_key(|path| {
            std::fs::metadata(path)
                .and_then(|m| m.modified())
                .ok()
        }),
    }

    // If the inverse flag is set and ordering isn't randomized, invert the order
    if args.inverse && args.order != SortOrder::Randomize {
        files.reverse();
    }

    let (images, skipped) = probe_images(files);
    if images.is_empty() {
        return Err(anyhow!(
            "No supported image files found in {}. Supported formats are: {}",
            args.directory.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        ));
    }
    log::info!(
        "Loaded {} images from {} ({} skipped)",
        images.len(),
        args.directory.display(),
        skipped.len()
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Image Prep")
            .with_inner_size([1400.0, 900.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ImagePrep",
        native_options,
        Box::new(
            move |cc| -> std::result::Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>> {
                let app = ImagePrepApp::new(cc, settings, images)?;
                Ok(Box::new(app))
            },
        ),
    )
    .map_err(|err| anyhow!("{err}"))?;

    Ok(())
}
