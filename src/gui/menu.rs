//! The main menu screen.
//!
//! Logo on top, the three mode buttons stacked beneath it, and a small exit
//! button at the bottom — the layout the kiosk has always had. DEMO and
//! GAME open a playback popup whose Play/Pause commands go straight to the
//! dispatch sink; EVENTS hands control to the events screen.

use std::path::Path;

use eframe::egui;
use log::{error, warn};

use crate::dispatch::{PlaybackCommand, PlaybackTarget, SubmissionSink};

/// What the menu asked the application to do this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Switch to the events screen.
    OpenEvents,
    /// Close the application (already confirmed by the operator).
    Quit,
}

/// Main menu screen state.
pub struct MenuScreen {
    logo_uri: Option<String>,
    playback: Option<PlaybackTarget>,
    confirm_exit: bool,
}

impl MenuScreen {
    /// Create the menu, probing the logo asset once.
    pub fn new(logo: Option<&Path>) -> Self {
        let logo_uri = logo.and_then(|path| {
            if path.exists() {
                Some(format!("file://{}", path.display()))
            } else {
                warn!("Logo asset {} not found, using text title", path.display());
                None
            }
        });
        Self {
            logo_uri,
            playback: None,
            confirm_exit: false,
        }
    }

    /// Render the menu. Returns the navigation/quit request, if any.
    pub fn ui(
        &mut self,
        ctx: &egui::Context,
        sink: &mut dyn SubmissionSink,
    ) -> Option<MenuAction> {
        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                if let Some(uri) = &self.logo_uri {
                    ui.add(egui::Image::from_uri(uri.clone()).max_width(380.0));
                } else {
                    ui.heading(egui::RichText::new(super::WINDOW_TITLE).size(40.0));
                }

                ui.add_space(40.0);

                if ui
                    .add_sized([170.0, 40.0], egui::Button::new("DEMO"))
                    .clicked()
                {
                    self.playback = Some(PlaybackTarget::Demo);
                }
                ui.add_space(8.0);
                if ui
                    .add_sized([170.0, 40.0], egui::Button::new("GAME"))
                    .clicked()
                {
                    self.playback = Some(PlaybackTarget::Game);
                }
                ui.add_space(8.0);
                if ui
                    .add_sized([170.0, 40.0], egui::Button::new("EVENTS"))
                    .clicked()
                {
                    action = Some(MenuAction::OpenEvents);
                }

                ui.add_space(28.0);
                if ui.add_sized([60.0, 30.0], egui::Button::new("Exit")).clicked() {
                    self.confirm_exit = true;
                }
            });
        });

        self.playback_popup(ctx, sink);
        if self.exit_popup(ctx) {
            action = Some(MenuAction::Quit);
        }

        action
    }

    /// The DEMO/GAME popup with Play, Pause and Exit.
    fn playback_popup(&mut self, ctx: &egui::Context, sink: &mut dyn SubmissionSink) {
        let Some(target) = self.playback else {
            return;
        };
        let mut close = false;

        egui::Window::new(format!("{target} Menu"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.vertical_centered_justified(|ui| {
                    ui.label(format!("{target} Options"));
                    ui.add_space(8.0);
                    if ui.button("Play").clicked() {
                        if let Err(err) = sink.playback(target, PlaybackCommand::Play) {
                            error!("Playback command failed: {err}");
                        }
                    }
                    if ui.button("Pause").clicked() {
                        if let Err(err) = sink.playback(target, PlaybackCommand::Pause) {
                            error!("Playback command failed: {err}");
                        }
                    }
                    if ui.button("Exit").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            self.playback = None;
        }
    }

    /// Exit confirmation. Returns true when the operator confirmed.
    fn exit_popup(&mut self, ctx: &egui::Context) -> bool {
        if !self.confirm_exit {
            return false;
        }
        let mut quit = false;
        let mut close = false;

        egui::Window::new("Exit Confirmation")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("Are you sure you want to exit?");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        quit = true;
                    }
                    if ui.button("No").clicked() {
                        close = true;
                    }
                });
            });

        if close || quit {
            self.confirm_exit = false;
        }
        quit
    }
}
