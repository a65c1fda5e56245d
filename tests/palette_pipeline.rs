use image::{Rgb, RgbImage};
use photism::core::color::match_all;
use photism::core::{NoteLetter, NoteNamer, OctaveScheme};
use photism::palette::{PaletteExtractor, VibrantExtractor};

fn striped(colors: &[[u8; 3]], stripe: u32) -> RgbImage {
    let width = stripe * colors.len() as u32;
    RgbImage::from_fn(width, 40, |x, _| Rgb(colors[(x / stripe) as usize]))
}

#[test]
fn saturated_image_yields_its_hues() {
    let image = striped(&[[250, 10, 10], [10, 10, 250]], 30);
    let samples = VibrantExtractor::default().extract(&image);

    assert!(!samples.is_empty());
    assert!(samples.len() <= 6);
    let letters = match_all(&samples);
    assert!(letters.contains(&NoteLetter::C) || letters.contains(&NoteLetter::G));
}

#[test]
fn white_image_has_no_palette() {
    let image = RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]));
    assert!(VibrantExtractor::default().extract(&image).is_empty());
}

#[test]
fn names_follow_palette_order() {
    let image = striped(&[[240, 20, 20], [20, 20, 200], [240, 230, 30]], 40);
    let samples = VibrantExtractor::default().extract(&image);
    let letters = match_all(&samples);
    let names = NoteNamer::new(OctaveScheme::TwoOctave).name_all(&letters);

    assert_eq!(names.len(), samples.len());
    for (letter, name) in letters.iter().zip(&names) {
        assert_eq!(name.letter, *letter);
        assert!(!name.sharp);
    }
}
