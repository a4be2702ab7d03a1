use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use image::DynamicImage;

use crate::{error::Result, image_utils::decode_image};

pub const HISTORY_LIMIT: usize = 10;

pub struct LoadedImage {
    pub path: PathBuf,
    pub image: Arc<DynamicImage>,
    pub load_duration: Duration,
}

/// Decodes full-resolution originals and keeps the most recent ones around so
/// stepping back and forth does not decode again.
pub struct Loader {
    preload_rx: Receiver<LoadedImage>,
    path_tx: Sender<PathBuf>,
    pub history: VecDeque<LoadedImage>,
}

impl Loader {
    pub fn new() -> Self {
        let (preload_rx, path_tx) = Self::spawn_preloader();
        Self {
            preload_rx,
            path_tx,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    fn spawn_preloader() -> (Receiver<LoadedImage>, Sender<PathBuf>) {
        let (preload_tx, preload_rx) = mpsc::channel();
        let (path_tx, path_rx) = mpsc::channel::<PathBuf>();

        thread::spawn(move || {
            while let Ok(path) = path_rx.recv() {
                let start = Instant::now();
                match decode_image(&path) {
                    Ok(image) => {
                        let entry = LoadedImage {
                            path,
                            image: Arc::new(image),
                            load_duration: start.elapsed(),
                        };
                        if preload_tx.send(entry).is_err() {
                            break;
                        }
                    }
                    Err(err) => log::warn!("Preload failed: {err}"),
                }
            }
        });
        (preload_rx, path_tx)
    }

    /// Whether a decoded copy of `path` is already held.
    pub fn contains(&self, path: &Path) -> bool {
        self.history.iter().any(|e| e.path == path)
    }

    /// Starts decoding `path` in the background unless it is already held.
    pub fn preload(&self, path: PathBuf) {
        if self.contains(&path) {
            return;
        }
        let _ = self.path_tx.send(path);
    }

    /// Moves finished background decodes into the history.
    pub fn update(&mut self) {
        while let Ok(entry) = self.preload_rx.try_recv() {
            log::debug!("Preloaded {} in {:?}", entry.path.display(), entry.load_duration);
            self.push_history(entry);
        }
    }

    /// Returns the decoded original, from history when possible.
    pub fn load(&mut self, path: &Path) -> Result<Arc<DynamicImage>> {
        self.update();
        if let Some(idx) = self.history.iter().position(|e| e.path == path) {
            if let Some(entry) = self.history.remove(idx) {
                log::debug!(
                    "Reusing {} (decoded in {:?})",
                    path.display(),
                    entry.load_duration
                );
                let image = entry.image.clone();
                self.history.push_back(entry);
                return Ok(image);
            }
        }

        let start = Instant::now();
        let entry = LoadedImage {
            path: path.to_path_buf(),
            image: Arc::new(decode_image(path)?),
            load_duration: start.elapsed(),
        };
        log::debug!("Decoded {} in {:?}", path.display(), entry.load_duration);
        let image = entry.image.clone();
        self.push_history(entry);
        Ok(image)
    }

    pub fn push_history(&mut self, image: LoadedImage) {
        self.history.retain(|e| e.path != image.path);
        if self.history.len() >= HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(image);
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
