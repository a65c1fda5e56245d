//! Dominant-color extraction from images.

mod vibrant;
mod worker;

pub use vibrant::{quantize, select, PaletteSwatch, SwatchKind, VibrantExtractor};
pub use worker::{fit_to_canvas, load_image, spawn_extraction, LoadedImage, CANVAS_SIZE};

use image::RgbImage;

use crate::core::ColorSample;

/// Produces an ordered list of representative colors for an image.
pub trait PaletteExtractor {
    fn extract(&self, image: &RgbImage) -> Vec<ColorSample>;
}
