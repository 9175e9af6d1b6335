//! Static stencil restricting where the detector looks.

use std::path::Path;

use image::{GrayImage, Luma, Rgb, RgbImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaskError {
    #[error("failed to load mask: {0}")]
    Load(#[from] image::ImageError),
    #[error("mask is {mask:?} but frame is {frame:?}")]
    DimensionMismatch { mask: (u32, u32), frame: (u32, u32) },
}

/// Binary stencil the same size as every frame. Pixels outside it are zeroed
/// before detection.
#[derive(Debug, Clone)]
pub struct Mask {
    stencil: GrayImage,
}

impl Mask {
    /// Load a mask image; a pixel is inside when any channel is non-zero.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MaskError> {
        let image = image::open(path)?.to_rgb8();
        Ok(Self::from_rgb(&image))
    }

    pub fn from_rgb(image: &RgbImage) -> Self {
        let stencil = GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let Rgb(px) = *image.get_pixel(x, y);
            if px.iter().any(|&c| c != 0) {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        Self { stencil }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.stencil.dimensions()
    }

    /// Elementwise AND of the frame with the stencil.
    pub fn apply(&self, frame: &RgbImage) -> Result<RgbImage, MaskError> {
        if frame.dimensions() != self.stencil.dimensions() {
            return Err(MaskError::DimensionMismatch {
                mask: self.stencil.dimensions(),
                frame: frame.dimensions(),
            });
        }
        Ok(RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
            if self.stencil.get_pixel(x, y)[0] != 0 {
                *frame.get_pixel(x, y)
            } else {
                Rgb([0, 0, 0])
            }
        }))
    }
}
