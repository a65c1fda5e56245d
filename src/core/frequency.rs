//! Equal-tempered frequencies referenced to A4 = 440 Hz.

use super::error::{PhotismError, PhotismResult};
use super::naming::{NoteLetter, NoteName};

/// Concert pitch.
pub const CONCERT_A_HZ: f64 = 440.0;
/// Piano key number of A4.
pub const CONCERT_A_KEY: i32 = 49;

/// Chromatic spellings starting at A.
pub const CHROMATIC_ORDER: [(NoteLetter, bool); 12] = [
    (NoteLetter::A, false),
    (NoteLetter::A, true),
    (NoteLetter::B, false),
    (NoteLetter::C, false),
    (NoteLetter::C, true),
    (NoteLetter::D, false),
    (NoteLetter::D, true),
    (NoteLetter::E, false),
    (NoteLetter::F, false),
    (NoteLetter::F, true),
    (NoteLetter::G, false),
    (NoteLetter::G, true),
];

/// Position of the name's spelling in [`CHROMATIC_ORDER`].
pub fn key_index(name: &NoteName) -> PhotismResult<i32> {
    CHROMATIC_ORDER
        .iter()
        .position(|&(letter, sharp)| letter == name.letter && sharp == name.sharp)
        .map(|i| i as i32)
        .ok_or_else(|| PhotismError::UnknownNote(name.to_string()))
}

/// Piano-style key number, A4 = 49.
///
/// A, A# and B sit at the top of the octave below C, hence the extra 12.
pub fn key_number(name: &NoteName) -> PhotismResult<i32> {
    let index = key_index(name)?;
    let octave_base = (name.octave as i32 - 1) * 12 + 1;
    if index < 3 {
        Ok(index + 12 + octave_base)
    } else {
        Ok(index + octave_base)
    }
}

/// Frequency in Hz.
pub fn frequency(name: &NoteName) -> PhotismResult<f64> {
    let steps = key_number(name)? - CONCERT_A_KEY;
    let octaves = steps.div_euclid(12);
    let semitones = steps.rem_euclid(12);

    // Whole octaves are a power-of-two scale, which is exact in binary floating point.
    let ratio = 2f64.powf(semitones as f64 / 12.0);
    Ok(CONCERT_A_HZ * ratio * 2f64.powi(octaves))
}

/// Frequencies of every name, in order.
pub fn frequencies(names: &[NoteName]) -> PhotismResult<Vec<f64>> {
    names.iter().map(frequency).collect()
}
