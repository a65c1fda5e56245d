pub mod app;
pub mod audio;
pub mod config;
pub mod core;
pub mod messaging;
pub mod notation;
pub mod palette;
pub mod ui;
pub mod utils;
