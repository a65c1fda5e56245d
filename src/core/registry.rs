//! Enable/disable state for every note named in the current run.

use log::debug;

use super::color::ColorSample;
use super::error::{PhotismError, PhotismResult};
use super::naming::NoteName;

/// How many notes a fresh run enables by default.
pub const DEFAULT_ENABLED: usize = 3;

/// Visual marker attached to a note.
pub trait Swatch {
    fn mark_active(&mut self);
    fn mark_inactive(&mut self);
}

/// Registry entry for one note name.
#[derive(Debug, Clone)]
pub struct NoteEntry<S> {
    pub name: NoteName,
    pub enabled: bool,
    /// Color of the first sample that produced this name.
    pub color: ColorSample,
    /// Every swatch showing this name. More than one only when a name repeats.
    pub swatches: Vec<S>,
}

impl<S: Swatch> NoteEntry<S> {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        for swatch in &mut self.swatches {
            if enabled {
                swatch.mark_active();
            } else {
                swatch.mark_inactive();
            }
        }
    }
}

/// Note state for one classification run, in registration order.
#[derive(Debug, Clone)]
pub struct ActiveNoteRegistry<S> {
    entries: Vec<NoteEntry<S>>,
}

impl<S> Default for ActiveNoteRegistry<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S: Swatch> ActiveNoteRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a note in the disabled state.
    ///
    /// Returns `false` if the name was already present. The swatch then joins the
    /// existing entry and takes on its current state.
    pub fn register(&mut self, name: NoteName, color: ColorSample, mut swatch: S) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            if entry.enabled {
                swatch.mark_active();
            } else {
                swatch.mark_inactive();
            }
            entry.swatches.push(swatch);
            debug!("{} registered again, sharing its entry", name);
            return false;
        }

        swatch.mark_inactive();
        self.entries.push(NoteEntry {
            name,
            enabled: false,
            color,
            swatches: vec![swatch],
        });
        true
    }

    fn entry_mut(&mut self, name: &NoteName) -> PhotismResult<&mut NoteEntry<S>> {
        self.entries
            .iter_mut()
            .find(|e| e.name == *name)
            .ok_or(PhotismError::UnknownName(*name))
    }

    pub fn entry(&self, name: &NoteName) -> PhotismResult<&NoteEntry<S>> {
        self.entries
            .iter()
            .find(|e| e.name == *name)
            .ok_or(PhotismError::UnknownName(*name))
    }

    pub fn enable(&mut self, name: &NoteName) -> PhotismResult<()> {
        self.set_enabled(name, true)
    }

    pub fn disable(&mut self, name: &NoteName) -> PhotismResult<()> {
        self.set_enabled(name, false)
    }

    pub fn set_enabled(&mut self, name: &NoteName, enabled: bool) -> PhotismResult<()> {
        self.entry_mut(name)?.set_enabled(enabled);
        Ok(())
    }

    /// Flip a note, returning its new state.
    pub fn toggle(&mut self, name: &NoteName) -> PhotismResult<bool> {
        let entry = self.entry_mut(name)?;
        let enabled = !entry.enabled;
        entry.set_enabled(enabled);
        Ok(enabled)
    }

    pub fn is_enabled(&self, name: &NoteName) -> PhotismResult<bool> {
        self.entry(name).map(|e| e.enabled)
    }

    /// Enable the first `count` notes in registration order.
    pub fn seed_defaults(&mut self, count: usize) {
        for entry in self.entries.iter_mut().take(count) {
            entry.set_enabled(true);
        }
    }

    /// Enabled names in registration order.
    pub fn enabled_names(&self) -> Vec<NoteName> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.name)
            .collect()
    }

    pub fn names(&self) -> Vec<NoteName> {
        self.entries.iter().map(|e| e.name).collect()
    }

    pub fn entries(&self) -> &[NoteEntry<S>] {
        &self.entries
    }

    /// Every swatch with the name it belongs to.
    pub fn swatches(&self) -> impl Iterator<Item = (&NoteName, &S)> {
        self.entries
            .iter()
            .flat_map(|e| e.swatches.iter().map(move |s| (&e.name, s)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::naming::NoteLetter;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    struct Marker {
        active: bool,
        changes: usize,
    }

    impl Swatch for Marker {
        fn mark_active(&mut self) {
            self.active = true;
            self.changes += 1;
        }

        fn mark_inactive(&mut self) {
            self.active = false;
            self.changes += 1;
        }
    }

    fn note(s: &str) -> NoteName {
        s.parse().unwrap()
    }

    fn registry(names: &[&str]) -> ActiveNoteRegistry<Marker> {
        let mut registry = ActiveNoteRegistry::new();
        for name in names {
            registry.register(note(name), ColorSample::default(), Marker::default());
        }
        registry
    }

    #[test]
    fn notes_start_disabled() {
        let registry = registry(&["C4", "G4"]);
        assert_eq!(registry.is_enabled(&note("C4")), Ok(false));
        assert!(registry.enabled_names().is_empty());
    }

    #[test]
    fn enable_and_disable_update_state_and_swatch() {
        let mut registry = registry(&["C4", "G4"]);
        registry.enable(&note("G4")).unwrap();
        assert_eq!(registry.enabled_names(), vec![note("G4")]);
        assert!(registry.entry(&note("G4")).unwrap().swatches[0].active);

        registry.disable(&note("G4")).unwrap();
        assert!(registry.enabled_names().is_empty());
        assert!(!registry.entry(&note("G4")).unwrap().swatches[0].active);
    }

    #[test]
    fn toggle_returns_new_state() {
        let mut registry = registry(&["E4"]);
        assert_eq!(registry.toggle(&note("E4")), Ok(true));
        assert_eq!(registry.toggle(&note("E4")), Ok(false));
    }

    #[test]
    fn unknown_names_fail() {
        let mut registry = registry(&["C4"]);
        let missing = NoteName::new(NoteLetter::D, 4);
        assert_eq!(registry.enable(&missing), Err(PhotismError::UnknownName(missing)));
        assert_eq!(registry.disable(&missing), Err(PhotismError::UnknownName(missing)));
        assert_eq!(registry.toggle(&missing), Err(PhotismError::UnknownName(missing)));
    }

    #[test]
    fn seeding_enables_first_three_in_registration_order() {
        let mut registry = registry(&["G4", "C4", "E4", "A4", "B4"]);
        registry.seed_defaults(DEFAULT_ENABLED);
        assert_eq!(registry.enabled_names(), vec![note("G4"), note("C4"), note("E4")]);

        let mut small = self::registry(&["D4", "D5"]);
        small.seed_defaults(DEFAULT_ENABLED);
        assert_eq!(small.enabled_names(), vec![note("D4"), note("D5")]);
    }

    #[test]
    fn enabled_names_keep_registration_order() {
        let mut registry = registry(&["F4", "A4", "C4"]);
        registry.enable(&note("C4")).unwrap();
        registry.enable(&note("F4")).unwrap();
        assert_eq!(registry.enabled_names(), vec![note("F4"), note("C4")]);
    }

    #[test]
    fn repeated_name_shares_one_entry() {
        let mut registry = registry(&["D4", "D5"]);
        registry.enable(&note("D5")).unwrap();
        let added = registry.register(note("D5"), ColorSample::default(), Marker::default());

        assert!(!added);
        assert_eq!(registry.len(), 2);
        let entry = registry.entry(&note("D5")).unwrap();
        assert_eq!(entry.swatches.len(), 2);
        assert!(entry.swatches.iter().all(|s| s.active));

        registry.disable(&note("D5")).unwrap();
        let entry = registry.entry(&note("D5")).unwrap();
        assert!(entry.swatches.iter().all(|s| !s.active));
        assert_eq!(registry.swatches().count(), 3);
    }
}
