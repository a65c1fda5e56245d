use std::path::PathBuf;

use crate::core::{NoteName, OctaveScheme, PhotismResult, RunId};
use crate::palette::LoadedImage;

/// Message types for communication between UI, palette worker and session
#[derive(Debug, Clone)]
pub enum AppMessage {
    OpenImage(PathBuf),
    PaletteReady {
        run: RunId,
        result: PhotismResult<LoadedImage>,
    },
    ToggleNote(NoteName),
    TogglePlayback,
    ExportChord(PathBuf),
    SetOctaveScheme(OctaveScheme),
    SelectOutputDevice(Option<String>),
}
