//! Playing and stopping the tones of the enabled notes together.

use log::{debug, warn};

use super::error::PhotismResult;
use super::frequency::frequency;
use super::naming::NoteName;

/// Volume applied to every tone when playback starts.
pub const PLAYBACK_VOLUME: f32 = 0.5;
/// Envelope attack in seconds.
pub const ATTACK_SECONDS: f32 = 0.5;
/// Envelope release in seconds.
pub const RELEASE_SECONDS: f32 = 0.25;

/// A playable tone at a fixed frequency.
pub trait ToneSource {
    fn frequency(&self) -> f64;
    fn set_volume(&mut self, volume: f32);
    fn start(&mut self) -> PhotismResult<()>;
    fn stop(&mut self);
}

/// Builds tone sources.
pub trait ToneEngine {
    type Source: ToneSource;

    fn build_source(&mut self, frequency: f64) -> PhotismResult<Self::Source>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// Owns the tone sources of the enabled notes.
pub struct PlaybackController<E: ToneEngine> {
    engine: E,
    sources: Vec<E::Source>,
    state: PlaybackState,
}

fn start_all<S: ToneSource>(sources: &mut [S]) -> PhotismResult<()> {
    for i in 0..sources.len() {
        sources[i].set_volume(PLAYBACK_VOLUME);
        if let Err(e) = sources[i].start() {
            warn!("Tone at {:.2} Hz failed to start: {}", sources[i].frequency(), e);
            for started in &mut sources[..i] {
                started.stop();
            }
            return Err(e);
        }
    }
    Ok(())
}

impl<E: ToneEngine> PlaybackController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            sources: Vec::new(),
            state: PlaybackState::Stopped,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn sources(&self) -> &[E::Source] {
        &self.sources
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Build one source per name, without installing them.
    pub fn build_sources(&mut self, names: &[NoteName]) -> PhotismResult<Vec<E::Source>> {
        names
            .iter()
            .map(|name| {
                let hz = frequency(name)?;
                debug!("Building tone for {} at {:.2} Hz", name, hz);
                self.engine.build_source(hz)
            })
            .collect()
    }

    /// Replace every source with one per name.
    ///
    /// While playing, the new sources are started before the old ones stop. Nothing
    /// changes if building or starting fails.
    pub fn rebuild(&mut self, names: &[NoteName]) -> PhotismResult<()> {
        let mut sources = self.build_sources(names)?;
        if self.is_playing() {
            start_all(&mut sources)?;
        }
        self.stop_sources();
        self.sources = sources;
        Ok(())
    }

    /// Stop everything and install already-built sources for a new run.
    pub fn reset(&mut self, sources: Vec<E::Source>) {
        self.stop_sources();
        self.sources = sources;
        self.state = PlaybackState::Stopped;
    }

    /// Start every source if stopped, stop every source if playing.
    ///
    /// With no sources and nothing playing this does nothing. Disabling every note while
    /// playing leaves the state at `Playing` with no sources; the next toggle then only
    /// returns the state to `Stopped`.
    pub fn toggle_play(&mut self) -> PhotismResult<PlaybackState> {
        match self.state {
            PlaybackState::Stopped => {
                if self.sources.is_empty() {
                    return Ok(self.state);
                }
                start_all(&mut self.sources)?;
                self.state = PlaybackState::Playing;
            }
            PlaybackState::Playing => {
                self.stop_sources();
                self.state = PlaybackState::Stopped;
            }
        }
        Ok(self.state)
    }

    fn stop_sources(&mut self) {
        if self.is_playing() {
            for source in &mut self.sources {
                source.stop();
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory engine that records what happened to each tone.

    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::core::error::PhotismError;

    #[derive(Debug, Clone, PartialEq)]
    pub struct ToneLog {
        pub frequency: f64,
        pub volume: f32,
        pub playing: bool,
    }

    #[derive(Default, Clone)]
    pub struct FakeEngine {
        pub tones: Rc<RefCell<Vec<ToneLog>>>,
        /// Builds above this frequency fail.
        pub fail_build_above: Rc<Cell<Option<f64>>>,
        /// Starts above this frequency fail.
        pub fail_start_above: Rc<Cell<Option<f64>>>,
    }

    pub struct FakeTone {
        index: usize,
        frequency: f64,
        fail_start_above: Rc<Cell<Option<f64>>>,
        tones: Rc<RefCell<Vec<ToneLog>>>,
    }

    impl ToneSource for FakeTone {
        fn frequency(&self) -> f64 {
            self.frequency
        }

        fn set_volume(&mut self, volume: f32) {
            self.tones.borrow_mut()[self.index].volume = volume;
        }

        fn start(&mut self) -> PhotismResult<()> {
            if self.fail_start_above.get().is_some_and(|limit| self.frequency > limit) {
                return Err(PhotismError::collaborator("audio engine", "device lost"));
            }
            self.tones.borrow_mut()[self.index].playing = true;
            Ok(())
        }

        fn stop(&mut self) {
            self.tones.borrow_mut()[self.index].playing = false;
        }
    }

    impl ToneEngine for FakeEngine {
        type Source = FakeTone;

        fn build_source(&mut self, frequency: f64) -> PhotismResult<FakeTone> {
            if self.fail_build_above.get().is_some_and(|limit| frequency > limit) {
                return Err(PhotismError::collaborator("audio engine", "no voices left"));
            }
            let mut tones = self.tones.borrow_mut();
            tones.push(ToneLog {
                frequency,
                volume: 0.0,
                playing: false,
            });
            Ok(FakeTone {
                index: tones.len() - 1,
                frequency,
                fail_start_above: Rc::clone(&self.fail_start_above),
                tones: Rc::clone(&self.tones),
            })
        }
    }

    impl FakeEngine {
        pub fn playing_frequencies(&self) -> Vec<f64> {
            self.tones
                .borrow()
                .iter()
                .filter(|t| t.playing)
                .map(|t| t.frequency)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeEngine;
    use super::*;
    use crate::core::error::PhotismError;

    fn notes(list: &[&str]) -> Vec<NoteName> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn toggle_with_no_sources_is_a_no_op() {
        let mut playback = PlaybackController::new(FakeEngine::default());
        assert_eq!(playback.toggle_play(), Ok(PlaybackState::Stopped));
        assert_eq!(playback.state(), PlaybackState::Stopped);
    }

    #[test]
    fn toggle_starts_everything_at_half_volume_then_stops() {
        let engine = FakeEngine::default();
        let mut playback = PlaybackController::new(engine.clone());
        playback.rebuild(&notes(&["A4", "C4"])).unwrap();

        assert_eq!(playback.toggle_play(), Ok(PlaybackState::Playing));
        assert_eq!(engine.playing_frequencies().len(), 2);
        assert!(engine.tones.borrow().iter().all(|t| t.volume == PLAYBACK_VOLUME));

        assert_eq!(playback.toggle_play(), Ok(PlaybackState::Stopped));
        assert!(engine.playing_frequencies().is_empty());
    }

    #[test]
    fn rebuild_while_playing_swaps_the_chord() {
        let engine = FakeEngine::default();
        let mut playback = PlaybackController::new(engine.clone());
        playback.rebuild(&notes(&["A4"])).unwrap();
        playback.toggle_play().unwrap();

        playback.rebuild(&notes(&["A5"])).unwrap();
        assert_eq!(engine.playing_frequencies(), vec![880.0]);
        assert!(playback.is_playing());
    }

    #[test]
    fn failed_start_leaves_everything_stopped() {
        let engine = FakeEngine::default();
        engine.fail_start_above.set(Some(500.0));
        let mut playback = PlaybackController::new(engine.clone());
        playback.rebuild(&notes(&["A4", "A5"])).unwrap();

        let err = playback.toggle_play().unwrap_err();
        assert!(matches!(err, PhotismError::ExternalCollaboratorFailure { .. }));
        assert_eq!(playback.state(), PlaybackState::Stopped);
        assert!(engine.playing_frequencies().is_empty());
    }

    #[test]
    fn failed_build_keeps_previous_sources() {
        let engine = FakeEngine::default();
        engine.fail_build_above.set(Some(500.0));
        let mut playback = PlaybackController::new(engine);
        playback.rebuild(&notes(&["A4"])).unwrap();

        assert!(playback.rebuild(&notes(&["A4", "A5"])).is_err());
        assert_eq!(playback.sources().len(), 1);
        assert_eq!(playback.sources()[0].frequency(), 440.0);
    }

    #[test]
    fn toggle_after_every_note_is_removed_while_playing() {
        let engine = FakeEngine::default();
        let mut playback = PlaybackController::new(engine.clone());
        playback.rebuild(&notes(&["C4"])).unwrap();
        playback.toggle_play().unwrap();

        playback.rebuild(&[]).unwrap();
        assert!(playback.sources().is_empty());
        assert_eq!(playback.state(), PlaybackState::Playing);
        assert!(engine.playing_frequencies().is_empty());

        assert_eq!(playback.toggle_play(), Ok(PlaybackState::Stopped));
        assert_eq!(playback.toggle_play(), Ok(PlaybackState::Stopped));
        assert!(engine.playing_frequencies().is_empty());
    }
}
