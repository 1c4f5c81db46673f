//! Main window: drop surface, submit button, result and error panels.

mod settings;
mod upload;

use anyhow::Context;
use classify_core::{
    AppConfig, Classifier, ElementMap, FakeClassifier, FlowRuntime, HttpClassifier, Msg,
    SelectedFile,
};
use eframe::{App, Frame, egui};
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];
const DEMO_CONFIDENCE: f64 = 0.87;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Upload,
    Settings,
}

pub struct UiApp {
    config: AppConfig,
    config_path: Option<PathBuf>,
    demo: bool,
    runtime: FlowRuntime,
    panel: Panel,
    status: String,
    pending_server_url: String,
    pending_decimals: usize,
}

impl UiApp {
    pub fn new(config: AppConfig, config_path: Option<PathBuf>, demo: bool) -> anyhow::Result<Self> {
        let runtime = build_runtime(&config, demo)?;
        Ok(Self {
            pending_server_url: config.server_url.clone(),
            pending_decimals: config.probability_decimals,
            config,
            config_path,
            demo,
            runtime,
            panel: Panel::Upload,
            status: String::new(),
        })
    }

    pub fn endpoint_description(&self) -> String {
        if self.demo {
            "the demo classifier".to_string()
        } else {
            self.config.classify_url()
        }
    }

    fn queue_file(&mut self, loaded: classify_core::FlowResult<SelectedFile>) {
        match loaded {
            Ok(file) => {
                self.status = format!("Queued {}", file.name);
                self.runtime.dispatch(Msg::FileAdded(file));
            }
            Err(e) => {
                tracing::warn!("could not queue file: {e}");
                self.status = format!("Could not use file: {e}");
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let loaded = match (&file.bytes, &file.path) {
                (Some(bytes), _) => SelectedFile::from_bytes(file.name.clone(), bytes),
                (None, Some(path)) => SelectedFile::from_path(path),
                (None, None) => continue,
            };
            self.queue_file(loaded);
        }
    }

    fn pick_file(&mut self) {
        if let Some(path) = FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.queue_file(SelectedFile::from_path(path));
        }
    }

    fn submit(&mut self) {
        self.status = "Classifying...".to_string();
        self.runtime.dispatch(Msg::SubmitClicked);
    }

    fn remove_file(&mut self) {
        self.status.clear();
        self.runtime.dispatch(Msg::FileRemoved);
    }

    /// Point the runtime at the current config. The queued file and shown result stay.
    fn reconfigure_runtime(&mut self) -> anyhow::Result<()> {
        let classifier = build_classifier(&self.config, self.demo)?;
        self.runtime
            .reconfigure(classifier, self.config.probability_decimals);
        Ok(())
    }
}

fn build_classifier(
    config: &AppConfig,
    demo: bool,
) -> anyhow::Result<Arc<dyn Classifier + Send + Sync>> {
    if demo {
        let winner = config.labels.first().cloned().unwrap_or_default();
        return Ok(Arc::new(FakeClassifier::with_winner(
            &config.labels,
            &winner,
            DEMO_CONFIDENCE,
        )));
    }
    let client = HttpClassifier::new(config).context("could not build HTTP client")?;
    Ok(Arc::new(client))
}

fn build_runtime(config: &AppConfig, demo: bool) -> anyhow::Result<FlowRuntime> {
    let elements =
        ElementMap::new(config.labels.clone()).context("labels in the configuration are invalid")?;
    let classifier = build_classifier(config, demo)?;
    Ok(FlowRuntime::new(classifier, elements, config.probability_decimals))
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        if self.runtime.pump() > 0 && !self.runtime.flow().is_busy() {
            self.status.clear();
        }
        if self.runtime.flow().is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.panel, Panel::Upload, "Classify");
                ui.selectable_value(&mut self.panel, Panel::Settings, "Settings");
                ui.separator();
                if !self.status.is_empty() {
                    ui.label(&self.status);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.panel {
            Panel::Upload => self.render_upload_panel(ui),
            Panel::Settings => self.render_settings_panel(ui),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runtime_builds_from_default_config() {
        let app = UiApp::new(AppConfig::default(), None, true).unwrap();
        assert_eq!(app.endpoint_description(), "the demo classifier");
        assert!(!app.runtime.flow().is_busy());
    }

    #[test]
    fn remove_clears_the_queued_file() {
        let mut app = UiApp::new(AppConfig::default(), None, true).unwrap();
        app.queue_file(SelectedFile::from_bytes("a.png", b"img"));
        assert!(app.runtime.flow().can_submit());
        app.remove_file();
        assert!(app.runtime.flow().queue.is_empty());
        assert!(!app.runtime.flow().can_submit());
        assert!(app.status.is_empty());
    }

    #[test]
    fn runtime_refuses_labels_with_spaces() {
        let config = AppConfig {
            labels: vec!["robert lewandoski".into()],
            ..AppConfig::default()
        };
        assert!(build_runtime(&config, true).is_err());
    }
}
