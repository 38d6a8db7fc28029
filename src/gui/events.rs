//! The event-selection form screen.
//!
//! A scrollable list of selection rows, each cascading flavour → energy →
//! event numbers. The dropdowns show the Greek display symbols but store
//! internal flavour names; the energy list and the event-number limit come
//! from the catalogue through the `selection` module. Widgets here hold no
//! validation state of their own — every interaction funnels into the
//! owned [`Row`] records.

use eframe::egui;
use log::{error, info, warn};

use crate::catalog::SelectionCatalog;
use crate::dispatch::SubmissionSink;
use crate::selection::{self, Row, SubmitMode, SubmitPolicy};

/// What the events screen asked the application to do this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventsAction {
    /// Return to the main menu.
    Back,
    /// Re-read the catalogue file.
    ReloadCatalog,
}

/// Events screen state.
pub struct EventsScreen {
    rows: Vec<Row>,
    status: Option<String>,
    error: Option<String>,
}

impl Default for EventsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl EventsScreen {
    /// A fresh form with a single empty row.
    pub fn new() -> Self {
        Self {
            rows: vec![Row::new()],
            status: None,
            error: None,
        }
    }

    /// Drop all rows and messages, back to a single empty row.
    pub fn reset(&mut self) {
        self.rows = vec![Row::new()];
        self.status = None;
        self.error = None;
    }

    /// Render the form. Returns the navigation/reload request, if any.
    pub fn ui(
        &mut self,
        ctx: &egui::Context,
        catalog: &SelectionCatalog,
        sink: &mut dyn SubmissionSink,
        policy: SubmitPolicy,
    ) -> Option<EventsAction> {
        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(egui::RichText::new("Events Selection").size(30.0));
            });

            ui.horizontal(|ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_sized([30.0, 30.0], egui::Button::new("+"))
                        .on_hover_text("Add another selection row")
                        .clicked()
                    {
                        self.rows.push(Row::new());
                    }
                    if ui
                        .small_button("Reload")
                        .on_hover_text("Re-read the selection catalogue")
                        .clicked()
                    {
                        action = Some(EventsAction::ReloadCatalog);
                    }
                });
            });

            egui::Frame::group(ui.style()).show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, true])
                    .max_height((ui.available_height() - 110.0).max(120.0))
                    .show(ui, |ui| {
                        for (index, row) in self.rows.iter_mut().enumerate() {
                            row_ui(ui, index, row, catalog);
                            ui.add_space(6.0);
                        }
                    });
            });

            if let Some(err) = &self.error {
                ui.colored_label(egui::Color32::RED, err);
            }
            if let Some(status) = &self.status {
                ui.colored_label(egui::Color32::GREEN, status);
            }

            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                ui.horizontal(|ui| {
                    let spacing = (ui.available_width() - 390.0).max(0.0) / 2.0;
                    ui.add_space(spacing);
                    if ui
                        .add_sized([185.0, 50.0], egui::Button::new("Submit Static"))
                        .clicked()
                    {
                        self.submit(SubmitMode::Static, sink, policy);
                    }
                    ui.add_space(20.0);
                    if ui
                        .add_sized([185.0, 50.0], egui::Button::new("Submit Dynamic"))
                        .clicked()
                    {
                        self.submit(SubmitMode::Dynamic, sink, policy);
                    }
                });
                ui.add_space(8.0);
                if ui
                    .add_sized([170.0, 40.0], egui::Button::new("Back to Main Menu"))
                    .clicked()
                {
                    action = Some(EventsAction::Back);
                }
            });
        });

        action
    }

    /// Re-validate every row and hand the survivors to the sink.
    fn submit(&mut self, mode: SubmitMode, sink: &mut dyn SubmissionSink, policy: SubmitPolicy) {
        self.status = None;
        self.error = None;

        match selection::submit(&mut self.rows, mode, policy) {
            Ok(submission) => match sink.submit_events(&submission) {
                Ok(()) => {
                    info!("Submission successful: {} valid row(s) submitted", submission.rows.len());
                    self.status = Some(format!(
                        "Submitted {} row(s) [{mode}]",
                        submission.rows.len()
                    ));
                }
                Err(err) => {
                    error!("Submission hand-off failed: {err}");
                    self.error = Some(format!("Submission failed: {err}"));
                }
            },
            Err(err) => {
                warn!("Submission failed: {err}");
                self.error = Some(format!("Submission failed: {err}"));
            }
        }
    }

}

/// One selection row: flavour dropdown, energy dropdown, event-number entry.
fn row_ui(ui: &mut egui::Ui, index: usize, row: &mut Row, catalog: &SelectionCatalog) {
    ui.horizontal(|ui| {
        // Flavour selector: symbols on screen, internal names on the row.
        let selected_symbol = row
            .flavour()
            .map(|name| catalog.symbol_for_name(name).unwrap_or(name).to_string())
            .unwrap_or_else(|| "Flavour".to_string());
        egui::ComboBox::from_id_salt(("flavour", index))
            .selected_text(selected_symbol)
            .width(110.0)
            .show_ui(ui, |ui| {
                for option in catalog.flavour_options() {
                    let name = catalog.name_for_symbol(&option);
                    if ui
                        .selectable_label(row.flavour() == Some(name), &option)
                        .clicked()
                    {
                        row.select_flavour(name);
                    }
                }
            });

        // Energy selector, enabled once a flavour is chosen. Selecting an
        // energy resolves and caches the event limit on the row.
        let energies: Vec<String> = row
            .flavour()
            .map(|flavour| catalog.energies(flavour).to_vec())
            .unwrap_or_default();
        ui.add_enabled_ui(row.flavour().is_some(), |ui| {
            egui::ComboBox::from_id_salt(("energy", index))
                .selected_text(row.energy().unwrap_or("Energy").to_string())
                .width(90.0)
                .show_ui(ui, |ui| {
                    for energy in &energies {
                        if ui
                            .selectable_label(row.energy() == Some(energy.as_str()), energy)
                            .clicked()
                        {
                            row.select_energy(catalog, energy);
                        }
                    }
                });
        });

        // Event numbers, committed on Enter or focus loss. Rejected input
        // comes back as an empty field.
        let response = ui.add_enabled(
            row.energy().is_some(),
            egui::TextEdit::singleline(&mut row.text)
                .hint_text("Event numbers")
                .horizontal_align(egui::Align::Center)
                .desired_width(220.0),
        );
        if response.lost_focus() {
            row.commit_text();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::RowPhase;

    #[test]
    fn test_new_form_has_one_empty_row() {
        let screen = EventsScreen::new();
        assert_eq!(screen.rows.len(), 1);
        assert_eq!(screen.rows[0].phase(), RowPhase::Unselected);
    }

    #[test]
    fn test_reset_clears_rows_and_messages() {
        let mut screen = EventsScreen::new();
        screen.rows.push(Row::new());
        screen.status = Some("Submitted 1 row(s) [Static]".to_string());
        screen.reset();
        assert_eq!(screen.rows.len(), 1);
        assert!(screen.status.is_none());
        assert!(screen.error.is_none());
    }
}
