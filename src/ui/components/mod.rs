mod chord_plot;
mod staff;
mod swatch;

pub use chord_plot::ChordPlot;
pub use staff::StaffView;
pub use swatch::SwatchView;
