use egui::{Color32, Response, Ui};
use egui_plot::{HLine, Line, LineStyle, Plot, PlotPoints, VLine};

/// Static plot of the chord preview, with dashed markers between periods.
pub struct ChordPlot<'a> {
    points: &'a [[f32; 2]],
    periods: usize,
    height: f32,
    color: Color32,
}

impl<'a> ChordPlot<'a> {
    pub fn new(points: &'a [[f32; 2]]) -> Self {
        Self {
            points,
            periods: 1,
            height: 90.0,
            color: Color32::from_rgb(0, 188, 212),
        }
    }

    /// Periods of the lowest tone across the x range.
    pub fn periods(mut self, periods: usize) -> Self {
        self.periods = periods.max(1);
        self
    }

    pub fn color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    pub fn show(self, ui: &mut Ui, id_salt: impl std::hash::Hash) -> Response {
        let guide = ui.visuals().weak_text_color().gamma_multiply(0.5);

        Plot::new(id_salt)
            .height(self.height)
            .show_axes(false)
            .show_grid(false)
            .show_x(false)
            .show_y(false)
            .include_x(0.0)
            .include_x(1.0)
            .include_y(-1.05)
            .include_y(1.05)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.hline(HLine::new(0.0).color(guide));
                for k in 1..self.periods {
                    let x = k as f64 / self.periods as f64;
                    plot_ui.vline(VLine::new(x).color(guide).style(LineStyle::dashed_loose()));
                }

                let points: PlotPoints = self
                    .points
                    .iter()
                    .map(|&[x, y]| [x as f64, y as f64])
                    .collect();
                plot_ui.line(Line::new(points).color(self.color).fill(0.0));
            })
            .response
    }
}
