pub mod engine;
pub mod render;
pub mod voice;

pub use engine::{output_device_names, CpalEngine, CpalTone};
pub use render::{export_wav, render_chord};
