use crate::error::{FlowError, FlowResult};
use directories_next::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Path of the classification endpoint, relative to `server_url`.
pub const CLASSIFY_PATH: &str = "/api/classify_image";

const CONFIG_FILE: &str = "scout.toml";

/// Largest accepted `probability_decimals`.
pub const MAX_DECIMALS: usize = 8;

/// Settings for the upload flow and its classifier client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the classification server, without the endpoint path.
    pub server_url: String,
    /// Sub-labels that get a row in the probability table, in display order.
    pub labels: Vec<String>,
    pub probability_decimals: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            labels: [
                "cristiano_ronaldo",
                "karim_benzema",
                "lionel_messi",
                "mohammed_salah",
                "robert_lewandoski",
                "zlatan_ibrahimovic",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            probability_decimals: 4,
        }
    }
}

impl AppConfig {
    pub fn classify_url(&self) -> String {
        format!("{}{CLASSIFY_PATH}", self.server_url.trim_end_matches('/'))
    }

    pub fn from_toml_str(raw: &str) -> FlowResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| FlowError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FlowResult<()> {
        if self.probability_decimals > MAX_DECIMALS {
            return Err(FlowError::Config(format!(
                "probability_decimals must be at most {MAX_DECIMALS}, got {}",
                self.probability_decimals
            )));
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> FlowResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| FlowError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Explicit path wins; otherwise the per-user config file if it exists; otherwise defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> FlowResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                tracing::info!("loading config from {}", path.display());
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> FlowResult<()> {
        let path = path.as_ref();
        let raw = toml::to_string_pretty(self).map_err(|e| FlowError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, raw)?;
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "scout", "Scout").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
