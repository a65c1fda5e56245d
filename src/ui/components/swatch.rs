use egui::{vec2, Align2, Color32, CursorIcon, FontId, Response, Sense, Ui};

use crate::core::color::nearest;
use crate::core::{ColorSample, NoteName, Swatch};

const SWATCH_SIZE: f32 = 56.0;
const LABEL_HEIGHT: f32 = 22.0;
const BORDER: f32 = 4.0;

/// One extracted color, clickable to toggle its note.
#[derive(Debug, Clone)]
pub struct SwatchView {
    /// Position of the color in the extracted palette.
    pub position: usize,
    pub color: ColorSample,
    pub note: NoteName,
    active: bool,
}

impl SwatchView {
    pub fn new(position: usize, color: ColorSample, note: NoteName) -> Self {
        Self {
            position,
            color,
            note,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn show(&self, ui: &mut Ui) -> Response {
        let size = vec2(SWATCH_SIZE + 2.0 * BORDER, SWATCH_SIZE + 2.0 * BORDER + LABEL_HEIGHT);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let fill = Color32::from_rgb(self.color.r, self.color.g, self.color.b);
            let square = egui::Rect::from_min_size(
                rect.min,
                vec2(SWATCH_SIZE + 2.0 * BORDER, SWATCH_SIZE + 2.0 * BORDER),
            );

            if self.active {
                painter.rect_filled(square, 6.0, ui.visuals().selection.stroke.color);
            } else if response.hovered() {
                painter.rect_filled(square, 6.0, ui.visuals().widgets.hovered.bg_fill);
            }
            painter.rect_filled(square.shrink(BORDER), 4.0, fill);

            let text_color = if self.active {
                ui.visuals().strong_text_color()
            } else {
                ui.visuals().weak_text_color()
            };
            painter.text(
                egui::pos2(rect.center().x, square.bottom() + LABEL_HEIGHT / 2.0),
                Align2::CENTER_CENTER,
                self.note.to_string(),
                FontId::proportional(15.0),
                text_color,
            );
        }

        let (_, distance) = nearest(self.color);
        response
            .on_hover_cursor(CursorIcon::PointingHand)
            .on_hover_text(format!(
                "{} → {} (distance {:.1})\nClick to {}",
                self.color,
                self.note,
                distance,
                if self.active { "disable" } else { "enable" }
            ))
    }
}

impl Swatch for SwatchView {
    fn mark_active(&mut self) {
        self.active = true;
    }

    fn mark_inactive(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_follow_the_registry() {
        let mut registry = crate::core::ActiveNoteRegistry::new();
        let name: NoteName = "C4".parse().unwrap();
        let red = ColorSample::new(255, 0, 0);
        registry.register(name, red, SwatchView::new(0, red, name));

        registry.enable(&name).unwrap();
        assert!(registry.swatches().all(|(_, s)| s.is_active()));
        registry.disable(&name).unwrap();
        assert!(registry.swatches().all(|(_, s)| !s.is_active()));
    }
}
