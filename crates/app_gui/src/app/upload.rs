//! The drop area, submit button, and the three result regions.

use super::UiApp;
use classify_core::View;
use classify_core::render::{
    DROP_ZONE_ID, ErrorKind, ERROR_ID, PROBABILITY_CELL_PREFIX, PROBABILITY_TABLE_ID, RESULT_DIV_ID,
    RESULT_HOLDER_ID, SUBMIT_BUTTON_ID,
};
use eframe::egui;
use egui_extras::{Column, TableBuilder};

impl UiApp {
    pub(super) fn render_upload_panel(&mut self, ui: &mut egui::Ui) {
        let queued = self
            .runtime
            .flow()
            .queue
            .current()
            .map(|file| file.name.clone());

        ui.push_id(DROP_ZONE_ID, |ui| {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_min_height(80.0);
                ui.vertical_centered(|ui| match &queued {
                    Some(name) => {
                        ui.label(format!("Ready: {name}"));
                        if ui.small_button("Remove").clicked() {
                            self.remove_file();
                        }
                    }
                    None => {
                        ui.label("Drop an image here");
                    }
                });
            });
        });

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui.button("Choose image...").clicked() {
                self.pick_file();
            }
            let can_submit = self.runtime.flow().can_submit();
            let submit = ui.push_id(SUBMIT_BUTTON_ID, |ui| {
                ui.add_enabled(can_submit, egui::Button::new("Classify"))
            });
            if submit.inner.clicked() {
                self.submit();
            }
            if self.runtime.flow().is_busy() {
                ui.spinner();
            }
        });

        ui.add_space(12.0);
        let view = self.runtime.view();
        render_view(ui, &view);
    }
}

fn render_view(ui: &mut egui::Ui, view: &View) {
    if view.error_visible {
        ui.push_id(ERROR_ID, |ui| {
            let headline = view.error_kind.unwrap_or(ErrorKind::NoMatch).headline();
            ui.colored_label(egui::Color32::from_rgb(200, 60, 60), headline);
            if let Some(reason) = &view.error_message {
                ui.small(reason);
            }
        });
    }

    if view.result_visible
        && let Some(card) = &view.result
    {
        ui.push_id(RESULT_DIV_ID, |ui| {
            ui.push_id(RESULT_HOLDER_ID, |ui| {
                ui.heading(&card.display_name);
                ui.label(format!("{} ({})", card.label, card.confidence));
            });
        });
    }

    if view.table_visible {
        ui.add_space(8.0);
        ui.push_id(PROBABILITY_TABLE_ID, |ui| render_table(ui, view));
    }
}

fn render_table(ui: &mut egui::Ui, view: &View) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(180.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Player");
            });
            header.col(|ui| {
                ui.strong("Probability");
            });
        })
        .body(|mut body| {
            for (id, probability) in &view.cells {
                let label = id.strip_prefix(PROBABILITY_CELL_PREFIX).unwrap_or(id);
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(classify_core::display_name(label));
                    });
                    row.col(|ui| {
                        ui.monospace(probability);
                    });
                });
            }
        });
}
