use std::path::{Path, PathBuf};

use eframe::egui;
use log::{error, info, warn};

use crate::audio::{export_wav, output_device_names, render_chord, CpalEngine};
use crate::audio::render::{EXPORT_HOLD_SECONDS, EXPORT_SAMPLE_RATE};
use crate::config::AppSettings;
use crate::core::{
    frequency, ClassifyOutcome, ColorSample, OctaveScheme, PhotismError, PhotismResult,
    PlaybackState, RunId, Session,
};
use crate::messaging::{AppMessage, MessageBus};
use crate::notation::Score;
use crate::palette::{spawn_extraction, LoadedImage, VibrantExtractor, CANVAS_SIZE};
use crate::ui::components::{ChordPlot, StaffView, SwatchView};
use crate::utils::audio_visualizer::{generate_chord_display, DISPLAY_PERIODS, DISPLAY_POINTS};
use crate::utils::helpers::{format_frequency, format_time};

const MAX_MESSAGES_PER_FRAME: usize = 64;
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

pub type AppSession = Session<Score, CpalEngine, SwatchView>;

enum Status {
    Info(String),
    Error(String),
}

/// The image currently shown, kept so a scheme change can re-run classification.
struct ShownImage {
    texture: egui::TextureHandle,
    size: egui::Vec2,
    path: PathBuf,
    samples: Vec<ColorSample>,
}

pub struct PhotismApp {
    session: AppSession,
    message_bus: MessageBus,
    settings: AppSettings,
    image: Option<ShownImage>,
    loading: Option<PathBuf>,
    status: Option<Status>,
    output_devices: Vec<String>,
    preview: Vec<[f32; 2]>,
    preview_revision: Option<u64>,
}

impl eframe::App for PhotismApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.message_bus.send(AppMessage::TogglePlayback);
        }

        self.process_messages(ctx);
        self.refresh_preview();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.render_toolbar(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.render_status(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_image(ui);
                ui.separator();
                self.render_palette(ui);
                ui.separator();
                self.render_chord(ui);
            });
        });
    }
}

impl PhotismApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let engine = CpalEngine::new(settings.output_device.as_deref());
        let status = engine
            .is_muted()
            .then(|| Status::Error("No audio output available; playback is muted".to_string()));
        let output_devices = output_device_names();
        info!("Found {} output devices", output_devices.len());

        Self {
            session: Session::new(Score::default(), engine, settings.octave_scheme),
            message_bus: MessageBus::new(),
            settings,
            image: None,
            loading: None,
            status,
            output_devices,
            preview: Vec::new(),
            preview_revision: None,
        }
    }

    fn process_messages(&mut self, ctx: &egui::Context) {
        for msg in self.message_bus.drain(MAX_MESSAGES_PER_FRAME) {
            match msg {
                AppMessage::OpenImage(path) => self.open_image(ctx, path),
                AppMessage::PaletteReady { run, result } => match result {
                    Ok(loaded) => self.apply_palette(ctx, run, loaded),
                    Err(e) => {
                        if self.session.fail_run(run, &e) {
                            self.loading = None;
                            self.status = Some(Status::Error(e.to_string()));
                        }
                    }
                },
                AppMessage::ToggleNote(name) => {
                    if let Err(e) = self.session.toggle(&name) {
                        error!("Toggling {} failed: {}", name, e);
                        self.status = Some(Status::Error(e.to_string()));
                    }
                }
                AppMessage::TogglePlayback => match self.session.toggle_play() {
                    Ok(state) => info!("Playback {:?}", state),
                    Err(e) => {
                        error!("Playback failed: {}", e);
                        self.status = Some(Status::Error(e.to_string()));
                    }
                },
                AppMessage::ExportChord(path) => self.export_chord(&path),
                AppMessage::SetOctaveScheme(scheme) => self.set_octave_scheme(scheme),
                AppMessage::SelectOutputDevice(device) => {
                    self.settings.output_device = device;
                    self.save_settings();
                    self.status = Some(Status::Info(
                        "Output device will be used after restart".to_string(),
                    ));
                }
            }
        }
    }

    fn open_image(&mut self, ctx: &egui::Context, path: PathBuf) {
        let run = self.session.begin_run();
        info!("Opening {} as {}", path.display(), run);

        if let Some(dir) = path.parent() {
            self.settings.last_image_dir = Some(dir.to_path_buf());
            self.save_settings();
        }

        let repaint = ctx.clone();
        match spawn_extraction(
            run,
            path.clone(),
            VibrantExtractor::default(),
            self.message_bus.sender(),
            move || repaint.request_repaint(),
        ) {
            Ok(_) => self.loading = Some(path),
            Err(e) => {
                let e = PhotismError::collaborator("palette extractor", format!("{:#}", e));
                self.session.fail_run(run, &e);
                self.status = Some(Status::Error(e.to_string()));
            }
        }
    }

    fn apply_palette(&mut self, ctx: &egui::Context, run: RunId, loaded: LoadedImage) {
        match self.session.classify(run, &loaded.samples, SwatchView::new) {
            Ok(ClassifyOutcome::Applied { names, enabled }) => {
                let size = [loaded.width as usize, loaded.height as usize];
                let texture = ctx.load_texture(
                    "photism-image",
                    egui::ColorImage::from_rgb(size, &loaded.rgb),
                    egui::TextureOptions::LINEAR,
                );
                self.status = Some(Status::Info(format!(
                    "{}: {} colors, {} enabled",
                    file_label(&loaded.path),
                    names.len(),
                    enabled.len()
                )));
                self.image = Some(ShownImage {
                    texture,
                    size: egui::vec2(loaded.width as f32, loaded.height as f32),
                    path: loaded.path,
                    samples: loaded.samples,
                });
                self.loading = None;
            }
            Ok(ClassifyOutcome::Stale) => {}
            Err(e) => {
                error!("Could not apply palette of {}: {}", loaded.path.display(), e);
                self.loading = None;
                self.status = Some(Status::Error(e.to_string()));
            }
        }
    }

    fn set_octave_scheme(&mut self, scheme: OctaveScheme) {
        if scheme == self.session.octave_scheme() {
            return;
        }
        self.session.set_octave_scheme(scheme);
        self.settings.octave_scheme = scheme;
        self.save_settings();

        // An image still loading picks up the new scheme when it arrives.
        let Some(image) = &self.image else {
            return;
        };
        if self.loading.is_some() {
            return;
        }
        let run = self.session.begin_run();
        if let Err(e) = self.session.classify(run, &image.samples, SwatchView::new) {
            self.status = Some(Status::Error(e.to_string()));
        }
    }

    fn export_chord(&mut self, path: &Path) {
        let frequencies = match self.session.enabled_frequencies() {
            Ok(f) => f,
            Err(e) => {
                self.status = Some(Status::Error(e.to_string()));
                return;
            }
        };
        if frequencies.is_empty() {
            self.status = Some(Status::Info("No notes enabled, nothing to export".to_string()));
            return;
        }

        let samples = render_chord(&frequencies, EXPORT_SAMPLE_RATE, EXPORT_HOLD_SECONDS);
        self.status = Some(match export_wav(path, &samples, EXPORT_SAMPLE_RATE) {
            Ok(()) => Status::Info(format!(
                "Exported {} of {} notes to {}",
                format_time(samples.len() as f32 / EXPORT_SAMPLE_RATE as f32),
                frequencies.len(),
                path.display()
            )),
            Err(e) => {
                error!("Export failed: {:#}", e);
                Status::Error(format!("{:#}", e))
            }
        });
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save() {
            warn!("Failed to save settings: {:#}", e);
        }
    }

    fn refresh_preview(&mut self) {
        let revision = self.session.notation().revision();
        if self.preview_revision == Some(revision) {
            return;
        }
        self.preview = preview_points(self.session.enabled_frequencies());
        self.preview_revision = Some(revision);
    }

    fn render_toolbar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Photism");
            ui.add_space(12.0);

            if ui.button("📂 Open image…").clicked() {
                let mut dialog = rfd::FileDialog::new().add_filter("Images", &IMAGE_EXTENSIONS);
                if let Some(dir) = &self.settings.last_image_dir {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(path) = dialog.pick_file() {
                    self.message_bus.send(AppMessage::OpenImage(path));
                }
            }

            let playing = self.session.playback_state() == PlaybackState::Playing;
            let can_play = playing || !self.session.enabled_names().is_empty();
            let label = if playing { "⏹ Stop" } else { "▶ Play" };
            if ui.add_enabled(can_play, egui::Button::new(label)).clicked() {
                self.message_bus.send(AppMessage::TogglePlayback);
            }

            let can_export = !self.session.enabled_names().is_empty();
            if ui.add_enabled(can_export, egui::Button::new("💾 Export WAV…")).clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("WAV", &["wav"])
                    .set_file_name("chord.wav")
                    .save_file()
                {
                    self.message_bus.send(AppMessage::ExportChord(path));
                }
            }

            let mut scheme = self.session.octave_scheme();
            egui::ComboBox::from_id_salt("octave_scheme")
                .selected_text(scheme.label())
                .show_ui(ui, |ui| {
                    for option in [OctaveScheme::TwoOctave, OctaveScheme::Cycling] {
                        ui.selectable_value(&mut scheme, option, option.label());
                    }
                });
            if scheme != self.session.octave_scheme() {
                self.message_bus.send(AppMessage::SetOctaveScheme(scheme));
            }

            ui.menu_button("🔊 Output", |ui| {
                let engine = self.session.playback().engine();
                match engine.device_name() {
                    Some(name) => ui.weak(format!("{} at {} Hz", name, engine.sample_rate())),
                    None => ui.weak("Muted"),
                };
                ui.separator();

                let current = self.settings.output_device.clone();
                if ui.radio(current.is_none(), "System default").clicked() {
                    self.message_bus.send(AppMessage::SelectOutputDevice(None));
                    ui.close_menu();
                }
                for name in &self.output_devices {
                    if ui.radio(current.as_deref() == Some(name.as_str()), name).clicked() {
                        self.message_bus
                            .send(AppMessage::SelectOutputDevice(Some(name.clone())));
                        ui.close_menu();
                    }
                }
            });
        });
    }

    fn render_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if let Some(path) = &self.loading {
                ui.spinner();
                ui.label(format!("Reading {}", file_label(path)));
            } else {
                match &self.status {
                    Some(Status::Info(text)) => {
                        ui.label(text);
                    }
                    Some(Status::Error(text)) => {
                        ui.colored_label(ui.visuals().error_fg_color, text);
                    }
                    None => {
                        ui.weak("Open an image to hear its colors");
                    }
                }
            }
        });
    }

    fn render_image(&self, ui: &mut egui::Ui) {
        let side = CANVAS_SIZE as f32;
        let (rect, response) = ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::hover());
        let painter = ui.painter();
        painter.rect_filled(rect, 4.0, ui.visuals().extreme_bg_color);

        match &self.image {
            Some(image) => {
                let image_rect = egui::Rect::from_center_size(rect.center(), image.size);
                egui::Image::new((image.texture.id(), image.size)).paint_at(ui, image_rect);
                response.on_hover_text(image.path.display().to_string());
            }
            None => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "No image",
                    egui::FontId::proportional(16.0),
                    ui.visuals().weak_text_color(),
                );
            }
        }
    }

    fn render_palette(&self, ui: &mut egui::Ui) {
        ui.strong("Palette");
        let mut swatches: Vec<&SwatchView> =
            self.session.registry().swatches().map(|(_, s)| s).collect();
        if swatches.is_empty() {
            ui.weak("No colors extracted");
            return;
        }
        swatches.sort_by_key(|s| s.position);

        ui.horizontal_wrapped(|ui| {
            for swatch in swatches {
                if swatch.show(ui).clicked() {
                    self.message_bus.send(AppMessage::ToggleNote(swatch.note));
                }
            }
        });
    }

    fn render_chord(&self, ui: &mut egui::Ui) {
        ui.strong("Chord");
        StaffView::new(self.session.notation())
            .width(ui.available_width().min(360.0))
            .show(ui);

        let enabled = self.session.enabled_names();
        if enabled.is_empty() {
            ui.weak("No notes enabled");
            return;
        }

        egui::Grid::new("enabled_notes")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for name in &enabled {
                    ui.label(name.to_string());
                    match frequency(name) {
                        Ok(hz) => ui.label(format_frequency(hz)),
                        Err(e) => ui.colored_label(ui.visuals().error_fg_color, e.to_string()),
                    };
                    ui.end_row();
                }
            });

        ui.add_space(6.0);
        let color = self
            .session
            .registry()
            .entries()
            .iter()
            .find(|e| e.enabled)
            .map(|e| egui::Color32::from_rgb(e.color.r, e.color.g, e.color.b))
            .unwrap_or(ui.visuals().selection.bg_fill);
        ChordPlot::new(&self.preview)
            .periods(DISPLAY_PERIODS)
            .color(color)
            .show(ui, "chord_preview");
    }
}

/// Preview of the enabled chord. An unplayable chord previews as a flat line.
fn preview_points(frequencies: PhotismResult<Vec<f64>>) -> Vec<[f32; 2]> {
    let frequencies = match frequencies {
        Ok(f) => f,
        Err(e) => {
            warn!("No chord preview: {}", e);
            Vec::new()
        }
    };
    generate_chord_display(&frequencies, DISPLAY_POINTS)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
