//! Error types for the color-to-note core.

use thiserror::Error;

use super::naming::NoteName;

/// Result type for core operations.
pub type PhotismResult<T> = Result<T, PhotismError>;

/// Errors surfaced by the core and by its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotismError {
    /// A note letter outside A–G.
    #[error("unknown note letter '{0}'")]
    UnknownLetter(char),

    /// A note spelling that is not in the chromatic ordering (e.g. `E#4`), or a
    /// string that does not parse as a note name.
    #[error("unknown note '{0}'")]
    UnknownNote(String),

    /// A registry operation on a name that was never registered in this run.
    #[error("note {0} is not registered")]
    UnknownName(NoteName),

    /// Palette extraction, image decoding or the audio engine failed.
    #[error("{collaborator} failed: {message}")]
    ExternalCollaboratorFailure {
        /// Which collaborator failed.
        collaborator: &'static str,
        /// What it reported.
        message: String,
    },
}

impl PhotismError {
    pub fn collaborator(collaborator: &'static str, message: impl Into<String>) -> Self {
        PhotismError::ExternalCollaboratorFailure {
            collaborator,
            message: message.into(),
        }
    }
}
