use crate::core::NoteName;

use super::NotationRenderer;

/// Absolute diatonic step of E4, the bottom line of the treble staff.
pub const BOTTOM_LINE_STEP: i32 = 4 * 7 + 2;
/// Staff position of F5, the top line.
pub const TOP_LINE_POSITION: i32 = 8;

/// A note placed on the treble staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffNote {
    pub name: NoteName,
    /// Diatonic steps above the bottom line. Even positions sit on lines.
    pub position: i32,
}

impl StaffNote {
    pub fn new(name: NoteName) -> Self {
        let step = name.octave as i32 * 7 + name.letter.diatonic_step();
        Self {
            name,
            position: step - BOTTOM_LINE_STEP,
        }
    }

    pub fn on_line(&self) -> bool {
        self.position.rem_euclid(2) == 0
    }

    /// Positions of the ledger lines this note needs, nearest to the staff first.
    pub fn ledger_lines(&self) -> Vec<i32> {
        if self.position < 0 {
            (self.position..=-2).rev().filter(|p| p % 2 == 0).collect()
        } else if self.position > TOP_LINE_POSITION {
            (TOP_LINE_POSITION + 2..=self.position)
                .filter(|p| p % 2 == 0)
                .collect()
        } else {
            Vec::new()
        }
    }
}

/// The enabled notes as a single whole-note chord.
#[derive(Debug, Clone, Default)]
pub struct Score {
    notes: Vec<StaffNote>,
    revision: u64,
}

impl Score {
    pub fn notes(&self) -> &[StaffNote] {
        &self.notes
    }

    pub fn names(&self) -> Vec<NoteName> {
        self.notes.iter().map(|n| n.name).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Bumped on every render.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Lowest and highest staff positions, including the staff itself.
    pub fn position_range(&self) -> (i32, i32) {
        self.notes.iter().fold((0, TOP_LINE_POSITION), |(lo, hi), n| {
            (lo.min(n.position), hi.max(n.position))
        })
    }
}

impl NotationRenderer for Score {
    fn render(&mut self, notes: &[NoteName]) {
        self.notes = notes.iter().copied().map(StaffNote::new).collect();
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn staff(s: &str) -> StaffNote {
        StaffNote::new(s.parse().unwrap())
    }

    #[test]
    fn positions_on_the_treble_staff() {
        assert_eq!(staff("E4").position, 0);
        assert_eq!(staff("F4").position, 1);
        assert_eq!(staff("B4").position, 4);
        assert_eq!(staff("F5").position, TOP_LINE_POSITION);
        assert_eq!(staff("C4").position, -2);
        assert_eq!(staff("C#4").position, -2);
        assert!(staff("G4").on_line());
        assert!(!staff("A4").on_line());
    }

    #[test]
    fn ledger_lines_below_and_above() {
        assert!(staff("G4").ledger_lines().is_empty());
        assert!(staff("D4").ledger_lines().is_empty());
        assert_eq!(staff("C4").ledger_lines(), vec![-2]);
        assert_eq!(staff("A3").ledger_lines(), vec![-2, -4]);
        assert!(staff("G5").ledger_lines().is_empty());
        assert_eq!(staff("A5").ledger_lines(), vec![10]);
        assert_eq!(staff("E6").ledger_lines(), vec![10, 12, 14]);
    }

    #[test]
    fn render_replaces_and_empty_clears() {
        let mut score = Score::default();
        score.render(&["C4".parse().unwrap(), "G5".parse().unwrap()]);
        assert_eq!(score.notes().len(), 2);
        assert_eq!(score.position_range(), (-2, 9));

        score.render(&[]);
        assert!(score.is_empty());
        assert_eq!(score.revision(), 2);
        assert_eq!(score.position_range(), (0, TOP_LINE_POSITION));
    }
}
