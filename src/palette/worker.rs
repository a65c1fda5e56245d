use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use image::RgbImage;
use log::{debug, info};

use super::PaletteExtractor;
use crate::core::{ColorSample, PhotismError, RunId};
use crate::messaging::AppMessage;

/// Side of the square area images are fitted into.
pub const CANVAS_SIZE: u32 = 400;

/// A decoded image and its palette.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Packed RGB pixels, row-major.
    pub rgb: Vec<u8>,
    pub samples: Vec<ColorSample>,
}

/// Shrink an image to fit the canvas, keeping its aspect ratio. Small images are
/// left as they are.
pub fn fit_to_canvas(image: image::DynamicImage) -> RgbImage {
    if image.width() > CANVAS_SIZE || image.height() > CANVAS_SIZE {
        image.thumbnail(CANVAS_SIZE, CANVAS_SIZE).to_rgb8()
    } else {
        image.to_rgb8()
    }
}

pub fn load_image(path: &Path) -> Result<RgbImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?;
    debug!(
        "Decoded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(fit_to_canvas(image))
}

fn load_and_extract<P: PaletteExtractor>(path: &Path, extractor: &P) -> Result<LoadedImage> {
    let image = load_image(path)?;
    let samples = extractor.extract(&image);
    info!("Extracted {} colors from {}", samples.len(), path.display());

    Ok(LoadedImage {
        path: path.to_path_buf(),
        width: image.width(),
        height: image.height(),
        rgb: image.into_raw(),
        samples,
    })
}

/// Decode and extract on a background thread, then post `PaletteReady` and call
/// `on_done`.
pub fn spawn_extraction<P, F>(
    run: RunId,
    path: PathBuf,
    extractor: P,
    sender: Sender<AppMessage>,
    on_done: F,
) -> Result<JoinHandle<()>>
where
    P: PaletteExtractor + Send + 'static,
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name("palette".to_string())
        .spawn(move || {
            let result = load_and_extract(&path, &extractor)
                .map_err(|e| PhotismError::collaborator("palette extractor", format!("{:#}", e)));
            sender.send(AppMessage::PaletteReady { run, result }).ok();
            on_done();
        })
        .context("Failed to spawn palette worker")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::VibrantExtractor;
    use image::{DynamicImage, Rgb};

    #[test]
    fn large_images_shrink_to_the_canvas() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(800, 200));
        let fitted = fit_to_canvas(image);
        assert_eq!((fitted.width(), fitted.height()), (400, 100));
    }

    #[test]
    fn small_images_keep_their_size() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(120, 90));
        let fitted = fit_to_canvas(image);
        assert_eq!((fitted.width(), fitted.height()), (120, 90));
    }

    #[test]
    fn worker_posts_the_palette() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        RgbImage::from_pixel(16, 16, Rgb([230, 20, 20])).save(&path).unwrap();

        let (sender, receiver) = crossbeam_channel::unbounded();
        let handle = spawn_extraction(
            RunId::default(),
            path.clone(),
            VibrantExtractor::default(),
            sender,
            || {},
        )
        .unwrap();
        handle.join().unwrap();

        match receiver.recv().unwrap() {
            AppMessage::PaletteReady { run, result } => {
                assert_eq!(run, RunId::default());
                let loaded = result.unwrap();
                assert_eq!(loaded.path, path);
                assert_eq!(loaded.rgb.len(), 16 * 16 * 3);
                assert_eq!(loaded.samples[0], ColorSample::new(230, 20, 20));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn unreadable_files_report_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");

        let (sender, receiver) = crossbeam_channel::unbounded();
        spawn_extraction(RunId::default(), path, VibrantExtractor::default(), sender, || {})
            .unwrap()
            .join()
            .unwrap();

        match receiver.recv().unwrap() {
            AppMessage::PaletteReady { result, .. } => match result {
                Err(PhotismError::ExternalCollaboratorFailure { collaborator, message }) => {
                    assert_eq!(collaborator, "palette extractor");
                    assert!(message.contains("missing.png"), "{message}");
                }
                other => panic!("expected a collaborator failure, got {:?}", other),
            },
            other => panic!("unexpected message {:?}", other),
        }
    }
}
