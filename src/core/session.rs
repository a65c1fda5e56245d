//! The session owns the active-note registry and keeps notation and audio in step with it.

use std::fmt;

use log::{debug, info, warn};

use super::color::{match_all, ColorSample};
use super::error::{PhotismError, PhotismResult};
use super::frequency::frequencies;
use super::naming::{NoteName, NoteNamer, OctaveScheme};
use super::playback::{PlaybackController, PlaybackState, ToneEngine};
use super::registry::{ActiveNoteRegistry, Swatch, DEFAULT_ENABLED};
use crate::notation::NotationRenderer;

/// Generation of a classification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RunId(u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run #{}", self.0)
    }
}

/// What [`Session::classify`] did with a palette.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyOutcome {
    Applied {
        names: Vec<NoteName>,
        enabled: Vec<NoteName>,
    },
    /// A newer run started before this palette arrived.
    Stale,
}

pub struct Session<R, E: ToneEngine, S> {
    registry: ActiveNoteRegistry<S>,
    notation: R,
    playback: PlaybackController<E>,
    namer: NoteNamer,
    current_run: RunId,
}

impl<R, E, S> Session<R, E, S>
where
    R: NotationRenderer,
    E: ToneEngine,
    S: Swatch,
{
    pub fn new(notation: R, engine: E, scheme: OctaveScheme) -> Self {
        Self {
            registry: ActiveNoteRegistry::new(),
            notation,
            playback: PlaybackController::new(engine),
            namer: NoteNamer::new(scheme),
            current_run: RunId::default(),
        }
    }

    /// Start a new run. Whatever is on screen stays until the run's palette is applied.
    pub fn begin_run(&mut self) -> RunId {
        self.current_run = RunId(self.current_run.0 + 1);
        debug!("Starting {}", self.current_run);
        self.current_run
    }

    pub fn current_run(&self) -> RunId {
        self.current_run
    }

    pub fn is_current(&self, run: RunId) -> bool {
        run == self.current_run
    }

    /// Classify a palette and replace all note state with the result.
    ///
    /// `make_swatch` receives each sample's position, color and note name. If the tones
    /// for the new run cannot be built the previous state is left untouched.
    pub fn classify<F>(
        &mut self,
        run: RunId,
        samples: &[ColorSample],
        mut make_swatch: F,
    ) -> PhotismResult<ClassifyOutcome>
    where
        F: FnMut(usize, ColorSample, NoteName) -> S,
    {
        if !self.is_current(run) {
            debug!("Dropping palette from {}, now on {}", run, self.current_run);
            return Ok(ClassifyOutcome::Stale);
        }

        let letters = match_all(samples);
        let names = self.namer.name_all(&letters);

        let mut registry = ActiveNoteRegistry::new();
        for (i, (&sample, &name)) in samples.iter().zip(&names).enumerate() {
            debug!("{} -> {}", sample, name);
            registry.register(name, sample, make_swatch(i, sample, name));
        }
        registry.seed_defaults(DEFAULT_ENABLED);

        let enabled = registry.enabled_names();
        let sources = self.playback.build_sources(&enabled)?;

        self.registry = registry;
        self.playback.reset(sources);
        self.notation.render(&enabled);

        info!(
            "{}: {} colors, {} notes, {} enabled",
            run,
            samples.len(),
            self.registry.len(),
            enabled.len()
        );
        Ok(ClassifyOutcome::Applied { names, enabled })
    }

    /// Record that a run's palette could not be produced. Note state is never touched.
    ///
    /// Returns whether the failure belongs to the current run.
    pub fn fail_run(&self, run: RunId, error: &PhotismError) -> bool {
        if self.is_current(run) {
            warn!("{} failed, keeping previous notes: {}", run, error);
            true
        } else {
            debug!("Ignoring failure of superseded {}: {}", run, error);
            false
        }
    }

    pub fn enable(&mut self, name: &NoteName) -> PhotismResult<()> {
        self.set_enabled(name, true)
    }

    pub fn disable(&mut self, name: &NoteName) -> PhotismResult<()> {
        self.set_enabled(name, false)
    }

    pub fn toggle(&mut self, name: &NoteName) -> PhotismResult<bool> {
        let enabled = !self.registry.is_enabled(name)?;
        self.set_enabled(name, enabled)?;
        Ok(enabled)
    }

    /// Set a note's state, then re-render notation and rebuild audio from the full
    /// enabled set. Rolls the note back if the audio rebuild fails.
    pub fn set_enabled(&mut self, name: &NoteName, enabled: bool) -> PhotismResult<()> {
        let previous = self.registry.is_enabled(name)?;
        self.registry.set_enabled(name, enabled)?;

        if let Err(e) = self.sync() {
            self.registry.set_enabled(name, previous)?;
            return Err(e);
        }

        debug!("{} {}", name, if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    fn sync(&mut self) -> PhotismResult<()> {
        let enabled = self.registry.enabled_names();
        self.playback.rebuild(&enabled)?;
        self.notation.render(&enabled);
        Ok(())
    }

    pub fn toggle_play(&mut self) -> PhotismResult<PlaybackState> {
        let state = self.playback.toggle_play()?;
        info!("Playback {:?} with {} tones", state, self.playback.sources().len());
        Ok(state)
    }

    pub fn enabled_names(&self) -> Vec<NoteName> {
        self.registry.enabled_names()
    }

    pub fn enabled_frequencies(&self) -> PhotismResult<Vec<f64>> {
        frequencies(&self.registry.enabled_names())
    }

    /// Applies from the next run on.
    pub fn set_octave_scheme(&mut self, scheme: OctaveScheme) {
        self.namer.set_scheme(scheme);
    }

    pub fn octave_scheme(&self) -> OctaveScheme {
        self.namer.scheme()
    }

    pub fn registry(&self) -> &ActiveNoteRegistry<S> {
        &self.registry
    }

    pub fn notation(&self) -> &R {
        &self.notation
    }

    pub fn playback(&self) -> &PlaybackController<E> {
        &self.playback
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }
}
