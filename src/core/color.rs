//! Reference colors and nearest-color note matching.
//!
//! Colors follow Newton's color/tone correspondence: C is red and the scale walks the
//! spectrum up to B, which is violet.

use std::fmt;

use super::error::{PhotismError, PhotismResult};
use super::naming::NoteLetter;

/// One RGB sample extracted from an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorSample {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Sum of the absolute per-channel differences.
    pub fn channel_difference(&self, other: &ColorSample) -> u16 {
        self.r.abs_diff(other.r) as u16
            + self.g.abs_diff(other.g) as u16
            + self.b.abs_diff(other.b) as u16
    }

    /// Mean of the absolute per-channel differences.
    pub fn distance(&self, other: &ColorSample) -> f32 {
        self.channel_difference(other) as f32 / 3.0
    }
}

impl fmt::Display for ColorSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for ColorSample {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// A note letter paired with its reference color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub letter: NoteLetter,
    pub color: ColorSample,
}

/// Reference table, one entry per letter, in alphabetical order.
///
/// The order is the tie-break order used by [`match_note`].
pub const REFERENCE_TABLE: [ReferenceEntry; 7] = [
    ReferenceEntry { letter: NoteLetter::A, color: ColorSample::new(75, 0, 130) },
    ReferenceEntry { letter: NoteLetter::B, color: ColorSample::new(143, 0, 255) },
    ReferenceEntry { letter: NoteLetter::C, color: ColorSample::new(255, 0, 0) },
    ReferenceEntry { letter: NoteLetter::D, color: ColorSample::new(255, 127, 0) },
    ReferenceEntry { letter: NoteLetter::E, color: ColorSample::new(255, 255, 0) },
    ReferenceEntry { letter: NoteLetter::F, color: ColorSample::new(0, 255, 0) },
    ReferenceEntry { letter: NoteLetter::G, color: ColorSample::new(0, 0, 255) },
];

/// Reference color for a letter.
pub fn reference_color(letter: NoteLetter) -> ColorSample {
    REFERENCE_TABLE[letter.index()].color
}

/// Reference color for a letter given as a character.
pub fn lookup(letter: char) -> PhotismResult<ColorSample> {
    NoteLetter::try_from(letter).map(reference_color)
}

/// Nearest reference letter and its distance.
pub fn nearest(sample: ColorSample) -> (NoteLetter, f32) {
    // Strict comparison keeps the earlier entry on ties, so they resolve alphabetically.
    let table: &'static [ReferenceEntry; 7] = &REFERENCE_TABLE;
    let best = table[1..]
        .iter()
        .fold(&table[0], |best, entry| {
            if entry.color.channel_difference(&sample) < best.color.channel_difference(&sample) {
                entry
            } else {
                best
            }
        });

    (best.letter, best.color.distance(&sample))
}

/// Letter whose reference color is closest to `sample`.
pub fn match_note(sample: ColorSample) -> NoteLetter {
    nearest(sample).0
}

/// Match every sample, preserving order.
pub fn match_all(samples: &[ColorSample]) -> Vec<NoteLetter> {
    samples.iter().copied().map(match_note).collect()
}

impl TryFrom<char> for NoteLetter {
    type Error = PhotismError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        NoteLetter::ALL
            .iter()
            .copied()
            .find(|letter| letter.as_char() == c.to_ascii_uppercase())
            .ok_or(PhotismError::UnknownLetter(c))
    }
}
