use egui::{pos2, vec2, Align2, FontId, Pos2, Sense, Stroke, Ui};

use crate::notation::{Score, StaffNote, TOP_LINE_POSITION};

const HALF_GAP: f32 = 6.0;
const HEAD_RADIUS: f32 = 5.5;
const MARGIN_STEPS: i32 = 3;

/// For a chord, which heads move right so seconds don't overlap.
///
/// Takes positions sorted from low to high.
pub fn shifted_heads(positions: &[i32]) -> Vec<bool> {
    let mut shifted: Vec<bool> = Vec::with_capacity(positions.len());
    for (i, &pos) in positions.iter().enumerate() {
        let shift = i > 0 && positions[i - 1] == pos - 1 && !shifted[i - 1];
        shifted.push(shift);
    }
    shifted
}

/// Paints a treble staff with the score as one whole-note chord.
pub struct StaffView<'a> {
    score: &'a Score,
    width: f32,
}

impl<'a> StaffView<'a> {
    pub fn new(score: &'a Score) -> Self {
        Self {
            score,
            width: 320.0,
        }
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn show(self, ui: &mut Ui) {
        let (lo, hi) = self.score.position_range();
        let top = hi + MARGIN_STEPS;
        let height = (top - lo + MARGIN_STEPS) as f32 * HALF_GAP;
        let (response, painter) = ui.allocate_painter(vec2(self.width, height), Sense::hover());
        let rect = response.rect;

        let y_of = |position: i32| rect.top() + (top - position) as f32 * HALF_GAP;
        let stroke = Stroke::new(1.0, ui.visuals().text_color());
        let left = rect.left() + 8.0;
        let right = rect.right() - 8.0;

        for line in (0..=TOP_LINE_POSITION).step_by(2) {
            painter.line_segment([pos2(left, y_of(line)), pos2(right, y_of(line))], stroke);
        }

        // Clef marker: a stem through the staff curled around the G line.
        let clef_x = left + 16.0;
        painter.line_segment(
            [pos2(clef_x, y_of(-2)), pos2(clef_x, y_of(TOP_LINE_POSITION + 2))],
            Stroke::new(1.5, stroke.color),
        );
        painter.circle_stroke(pos2(clef_x, y_of(2)), HALF_GAP * 1.6, Stroke::new(1.5, stroke.color));

        if self.score.is_empty() {
            return;
        }

        let mut notes: Vec<&StaffNote> = self.score.notes().iter().collect();
        notes.sort_by_key(|n| n.position);
        let positions: Vec<i32> = notes.iter().map(|n| n.position).collect();
        let shifts = shifted_heads(&positions);

        let chord_x = left + 90.0;
        for (note, shifted) in notes.iter().zip(shifts) {
            let x = if shifted {
                chord_x + HEAD_RADIUS * 2.2
            } else {
                chord_x
            };
            let center = Pos2::new(x, y_of(note.position));

            for ledger in note.ledger_lines() {
                let y = y_of(ledger);
                painter.line_segment(
                    [pos2(x - HEAD_RADIUS * 2.0, y), pos2(x + HEAD_RADIUS * 2.0, y)],
                    stroke,
                );
            }

            painter.circle_stroke(center, HEAD_RADIUS, Stroke::new(2.0, stroke.color));

            if note.name.sharp {
                painter.text(
                    center - vec2(HEAD_RADIUS * 3.0, 0.0),
                    Align2::CENTER_CENTER,
                    "#",
                    FontId::proportional(14.0),
                    stroke.color,
                );
            }
        }
    }
}
