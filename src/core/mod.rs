pub mod color;
pub mod error;
pub mod frequency;
pub mod naming;
pub mod playback;
pub mod registry;
pub mod session;

pub use color::{match_note, ColorSample};
pub use error::{PhotismError, PhotismResult};
pub use frequency::frequency;
pub use naming::{NoteLetter, NoteName, NoteNamer, OctaveScheme};
pub use playback::{PlaybackController, PlaybackState, ToneEngine, ToneSource};
pub use registry::{ActiveNoteRegistry, Swatch};
pub use session::{ClassifyOutcome, RunId, Session};
