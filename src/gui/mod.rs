//! The eframe/egui implementation for the GUI.
//!
//! The panel is a plain two-screen application built around a main [`Gui`]
//! struct that implements the `eframe::App` trait:
//!
//! - **Menu screen** (`menu`): logo, the DEMO/GAME playback popups, the
//!   EVENTS navigation button and an exit confirmation.
//! - **Events screen** (`events`): the dynamic selection form — flavour and
//!   energy dropdowns cascading into a bounded event-number entry, row
//!   management and the two submit actions.
//! - **Log panel** (`log_panel`): a collapsible bottom panel over the
//!   captured log buffer, with level and text filtering.
//!
//! Screen switching is a simple enum held by `Gui`; the active screen draws
//! into the central panel each frame. All form state lives in owned
//! [`Row`](crate::selection::Row) records inside the events screen, so the
//! widgets here are a thin rendering layer over the `selection` module.
//!
//! Everything runs on the UI thread. The only I/O the GUI ever performs is
//! the explicit catalogue reload.

pub mod events;
mod log_panel;
pub mod menu;

use std::path::Path;

use eframe::egui;
use log::{error, info, warn, LevelFilter};

use self::events::{EventsAction, EventsScreen};
use self::menu::{MenuAction, MenuScreen};
use crate::catalog::SelectionCatalog;
use crate::config::Settings;
use crate::dispatch::SubmissionSink;
use crate::log_capture::LogBuffer;

/// Title shown in the window decoration.
pub const WINDOW_TITLE: &str = "DUNE :: LEDCube";

/// Which screen is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Screen {
    #[default]
    Menu,
    Events,
}

/// The main GUI struct.
pub struct Gui {
    settings: Settings,
    catalog: SelectionCatalog,
    sink: Box<dyn SubmissionSink>,
    screen: Screen,
    menu: MenuScreen,
    events: EventsScreen,
    // Log panel state
    log_buffer: LogBuffer,
    show_log: bool,
    log_filter_text: String,
    log_level_filter: LevelFilter,
    scroll_to_bottom: bool,
}

impl Gui {
    /// Creates the GUI and installs fonts and image loaders.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        catalog: SelectionCatalog,
        sink: Box<dyn SubmissionSink>,
        log_buffer: LogBuffer,
    ) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        install_symbol_font(&cc.egui_ctx, settings.assets.font.as_deref());

        let menu = MenuScreen::new(settings.assets.logo.as_deref());
        Self {
            settings,
            catalog,
            sink,
            screen: Screen::default(),
            menu,
            events: EventsScreen::new(),
            log_buffer,
            show_log: false,
            log_filter_text: String::new(),
            log_level_filter: LevelFilter::Info,
            scroll_to_bottom: true,
        }
    }

    /// Re-read the catalogue file, keeping the old one on failure.
    ///
    /// The form is reset afterwards so no row carries a limit resolved
    /// against the previous catalogue.
    fn reload_catalog(&mut self) {
        match SelectionCatalog::load(&self.settings.catalog_path) {
            Ok(catalog) => {
                info!(
                    "Reloaded selection catalogue from {}",
                    self.settings.catalog_path.display()
                );
                self.catalog = catalog;
                self.events.reset();
            }
            Err(err) => {
                error!("Catalogue reload failed, keeping previous catalogue: {err}");
            }
        }
    }
}

impl eframe::App for Gui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.toggle_value(&mut self.show_log, "Event Log");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(env!("CARGO_PKG_VERSION"));
                });
            });
        });

        if self.show_log {
            egui::TopBottomPanel::bottom("log_panel")
                .resizable(true)
                .min_height(120.0)
                .default_height(160.0)
                .show(ctx, |ui| {
                    log_panel::render(ui, self);
                });
        }

        match self.screen {
            Screen::Menu => {
                if let Some(action) = self.menu.ui(ctx, self.sink.as_mut()) {
                    match action {
                        MenuAction::OpenEvents => self.screen = Screen::Events,
                        MenuAction::Quit => {
                            info!("Exit confirmed, closing window");
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    }
                }
            }
            Screen::Events => {
                let action = self.events.ui(
                    ctx,
                    &self.catalog,
                    self.sink.as_mut(),
                    self.settings.submit_policy,
                );
                match action {
                    Some(EventsAction::Back) => self.screen = Screen::Menu,
                    Some(EventsAction::ReloadCatalog) => self.reload_catalog(),
                    None => {}
                }
            }
        }
    }
}

/// Put a font with Greek glyph coverage at the front of the proportional
/// family so the flavour symbols (ν variants) render.
///
/// A missing font file only logs a warning; the built-in fonts stay in
/// place.
fn install_symbol_font(ctx: &egui::Context, path: Option<&Path>) {
    let Some(path) = path else {
        return;
    };
    match std::fs::read(path) {
        Ok(bytes) => {
            let mut fonts = egui::FontDefinitions::default();
            fonts
                .font_data
                .insert("symbols".to_owned(), egui::FontData::from_owned(bytes));
            fonts
                .families
                .entry(egui::FontFamily::Proportional)
                .or_default()
                .insert(0, "symbols".to_owned());
            fonts
                .families
                .entry(egui::FontFamily::Monospace)
                .or_default()
                .push("symbols".to_owned());
            ctx.set_fonts(fonts);
            info!("Installed flavour symbol font from {}", path.display());
        }
        Err(err) => {
            warn!(
                "Could not load font {}: {err}. Flavour symbols may render as boxes.",
                path.display()
            );
        }
    }
}
