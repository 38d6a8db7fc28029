//! LEDCube touch panel — application entry point.
//!
//! Startup order: CLI → logging → settings → catalogue → window. The
//! catalogue is loaded once here and owned by the GUI for the lifetime of
//! the process; a broken catalogue aborts startup with a descriptive error
//! instead of limping into the events screen.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use log::info;

use ledcube_touch::catalog::SelectionCatalog;
use ledcube_touch::config::Settings;
use ledcube_touch::dispatch::LogSink;
use ledcube_touch::gui::{Gui, WINDOW_TITLE};
use ledcube_touch::log_capture;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Touchscreen front-end for the LEDCube detector demo.
#[derive(Parser, Debug)]
#[command(name = "ledcube_touch", version, about)]
struct Cli {
    /// Settings file (TOML). Defaults to config/ledcube.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Selection catalogue (JSON). Overrides the settings file.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Start fullscreen regardless of settings.
    #[arg(long)]
    fullscreen: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load().context("loading settings")?,
    };
    if let Some(catalog_path) = cli.catalog {
        settings.catalog_path = catalog_path;
    }
    if cli.fullscreen {
        settings.window.fullscreen = true;
    }

    let log_buffer = log_capture::init(settings.level_filter())?;
    info!("Starting LEDCube touch panel v{}", env!("CARGO_PKG_VERSION"));

    let catalog = SelectionCatalog::load(&settings.catalog_path).with_context(|| {
        format!(
            "loading selection catalogue from {}",
            settings.catalog_path.display()
        )
    })?;
    info!(
        "Loaded selection catalogue: {} flavour(s), {} neutrino energies",
        catalog.flavours.name.len(),
        catalog.neutrino.energy.len()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([settings.window.width, settings.window.height])
            .with_fullscreen(settings.window.fullscreen),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            Ok(Box::new(Gui::new(
                cc,
                settings,
                catalog,
                Box::new(LogSink),
                log_buffer,
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("GUI terminated with error: {err}"))
}
