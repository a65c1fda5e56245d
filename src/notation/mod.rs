//! Staff notation for the enabled notes.

mod score;

pub use score::{Score, StaffNote, BOTTOM_LINE_STEP, TOP_LINE_POSITION};

use crate::core::NoteName;

/// Receives the full list of enabled notes after every change.
///
/// An empty slice clears the rendering.
pub trait NotationRenderer {
    fn render(&mut self, notes: &[NoteName]);
}
