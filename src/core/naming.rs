//! Note letters, note names and octave assignment.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PhotismError;

/// Octave given to the first occurrence of a letter.
pub const BASE_OCTAVE: u8 = 4;
/// Highest octave a single digit can name.
pub const MAX_OCTAVE: u8 = 9;

/// A natural note letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoteLetter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl NoteLetter {
    /// All letters in alphabetical order.
    pub const ALL: [NoteLetter; 7] = [
        NoteLetter::A,
        NoteLetter::B,
        NoteLetter::C,
        NoteLetter::D,
        NoteLetter::E,
        NoteLetter::F,
        NoteLetter::G,
    ];

    /// Position in alphabetical order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_char(self) -> char {
        match self {
            NoteLetter::A => 'A',
            NoteLetter::B => 'B',
            NoteLetter::C => 'C',
            NoteLetter::D => 'D',
            NoteLetter::E => 'E',
            NoteLetter::F => 'F',
            NoteLetter::G => 'G',
        }
    }

    /// Diatonic step within an octave, counted from C.
    pub fn diatonic_step(self) -> i32 {
        match self {
            NoteLetter::C => 0,
            NoteLetter::D => 1,
            NoteLetter::E => 2,
            NoteLetter::F => 3,
            NoteLetter::G => 4,
            NoteLetter::A => 5,
            NoteLetter::B => 6,
        }
    }
}

impl fmt::Display for NoteLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A letter, an optional sharp and an octave digit, e.g. `C4` or `F#5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteName {
    pub letter: NoteLetter,
    pub sharp: bool,
    pub octave: u8,
}

impl NoteName {
    pub fn new(letter: NoteLetter, octave: u8) -> Self {
        Self {
            letter,
            sharp: false,
            octave,
        }
    }

    pub fn sharp(letter: NoteLetter, octave: u8) -> Self {
        Self {
            letter,
            sharp: true,
            octave,
        }
    }

    /// The same spelling one octave higher.
    pub fn octave_up(self) -> Self {
        Self {
            octave: self.octave + 1,
            ..self
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accidental = if self.sharp { "#" } else { "" };
        write!(f, "{}{}{}", self.letter, accidental, self.octave)
    }
}

impl FromStr for NoteName {
    type Err = PhotismError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || PhotismError::UnknownNote(s.to_string());

        let mut chars = s.trim().chars().peekable();
        let letter = chars
            .next()
            .and_then(|c| NoteLetter::try_from(c).ok())
            .ok_or_else(unknown)?;
        let sharp = chars.next_if_eq(&'#').is_some();
        let octave = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(unknown)? as u8;
        if chars.next().is_some() {
            return Err(unknown());
        }

        Ok(NoteName {
            letter,
            sharp,
            octave,
        })
    }
}

impl Serialize for NoteName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NoteName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How repeated letters are spread over octaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OctaveScheme {
    /// First occurrence in octave 4, every later one in octave 5.
    ///
    /// A third occurrence of a letter gets the same name as the second.
    #[default]
    TwoOctave,
    /// Occurrence n goes to octave 4 + n, wrapping back to 4 after octave 9.
    Cycling,
}

impl OctaveScheme {
    pub fn octave_for(self, occurrence: usize) -> u8 {
        match self {
            OctaveScheme::TwoOctave => {
                if occurrence == 0 {
                    BASE_OCTAVE
                } else {
                    BASE_OCTAVE + 1
                }
            }
            OctaveScheme::Cycling => {
                let span = (MAX_OCTAVE - BASE_OCTAVE + 1) as usize;
                BASE_OCTAVE + (occurrence % span) as u8
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OctaveScheme::TwoOctave => "Two octaves",
            OctaveScheme::Cycling => "Cycling octaves",
        }
    }
}

/// Assigns octaves to a run of matched letters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteNamer {
    scheme: OctaveScheme,
}

impl NoteNamer {
    pub fn new(scheme: OctaveScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> OctaveScheme {
        self.scheme
    }

    pub fn set_scheme(&mut self, scheme: OctaveScheme) {
        self.scheme = scheme;
    }

    /// Name every letter in input order.
    pub fn name_all(&self, letters: &[NoteLetter]) -> Vec<NoteName> {
        let mut seen: HashMap<NoteLetter, usize> = HashMap::new();

        letters
            .iter()
            .map(|&letter| {
                let occurrence = seen.entry(letter).or_insert(0);
                let octave = self.scheme.octave_for(*occurrence);
                *occurrence += 1;
                NoteName::new(letter, octave)
            })
            .collect()
    }
}
