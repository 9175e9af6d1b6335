//! Sequential frame sources.

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("cannot open frame source {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("frame source {0} contains no images")]
    Empty(PathBuf),
    #[error("failed to decode frame {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame read failed: {0}")]
    Read(String),
}

/// Pull interface over a stream of frames.
///
/// `Ok(None)` marks the end of the stream. An `Err` is a read failure; the
/// pipeline treats both as the signal to stop and never retries.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, FrameError>;
}

/// Image files of a directory, played in file-name order.
#[derive(Debug)]
pub struct ImageDirSource {
    files: std::vec::IntoIter<PathBuf>,
}

impl ImageDirSource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, FrameError> {
        let dir = dir.as_ref();
        let open_err = |source| FrameError::Open {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(open_err)? {
            let path = entry.map_err(open_err)?.path();
            if path.is_file() && has_image_extension(&path) {
                files.push(path);
            }
        }
        if files.is_empty() {
            return Err(FrameError::Empty(dir.to_path_buf()));
        }
        files.sort();

        info!(dir = %dir.display(), frames = files.len(), "opened image directory");
        Ok(Self {
            files: files.into_iter(),
        })
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, FrameError> {
        let Some(path) = self.files.next() else {
            return Ok(None);
        };
        debug!(path = %path.display(), "decoding frame");
        let image = image::open(&path).map_err(|source| FrameError::Decode {
            path: path.clone(),
            source,
        })?;
        Ok(Some(image.to_rgb8()))
    }
}

/// Adapts any iterator of in-memory frames.
pub struct IterSource<I> {
    frames: I,
}

impl<I: Iterator<Item = RgbImage>> IterSource<I> {
    pub fn new(frames: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl<I: Iterator<Item = RgbImage>> FrameSource for IterSource<I> {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, FrameError> {
        Ok(self.frames.next())
    }
}
