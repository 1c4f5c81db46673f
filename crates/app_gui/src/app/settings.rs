//! Settings panel for the server address, number formatting, and the config file.

use super::{Panel, UiApp};
use classify_core::config::{MAX_DECIMALS, default_config_path};
use eframe::egui;

impl UiApp {
    /// Renders the settings screen. Changes take effect when applied.
    pub(super) fn render_settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Classification server");
            ui.text_edit_singleline(&mut self.pending_server_url);
        });
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            ui.label("Decimals");
            ui.add(
                egui::DragValue::new(&mut self.pending_decimals)
                    .range(0..=MAX_DECIMALS)
                    .speed(1),
            );
        });
        ui.add_space(12.0);
        ui.label(format!("Players: {}", self.config.labels.join(", ")));
        if self.demo {
            ui.label("Demo mode: answers come from a canned classifier.");
        }

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() {
                self.apply_pending_settings();
            }
            if ui.button("Save").clicked() {
                self.apply_pending_settings();
                self.save_config();
            }
        });

        ui.add_space(16.0);
        ui.separator();
        ui.label(format!("Version: {}", env!("SCOUT_VERSION")));
    }

    fn apply_pending_settings(&mut self) {
        let url = self.pending_server_url.trim().to_string();
        if url == self.config.server_url && self.pending_decimals == self.config.probability_decimals {
            return;
        }
        self.config.server_url = url;
        self.config.probability_decimals = self.pending_decimals;
        match self.reconfigure_runtime() {
            Ok(()) => {
                tracing::info!("now classifying via {}", self.endpoint_description());
                self.status = "Settings applied.".to_string();
                self.panel = Panel::Upload;
            }
            Err(e) => {
                tracing::warn!("settings not applied: {e:#}");
                self.status = format!("Settings not applied: {e}");
            }
        }
    }

    fn save_config(&mut self) {
        let Some(path) = self.config_path.clone().or_else(default_config_path) else {
            self.status = "No place to save the configuration.".to_string();
            return;
        };
        match self.config.save(&path) {
            Ok(()) => self.status = format!("Saved to {}", path.display()),
            Err(e) => {
                tracing::warn!("could not save config: {e}");
                self.status = format!("Could not save: {e}");
            }
        }
    }
}
