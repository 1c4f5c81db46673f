use crate::error::{FlowError, FlowResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The image currently held by the drop surface, already encoded for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    /// `data:<mime>;base64,<payload>`
    pub data_uri: String,
}

impl SelectedFile {
    /// Encode raw bytes. The MIME type is sniffed from the magic bytes, with the
    /// file name's extension as a fallback.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> FlowResult<Self> {
        let name = name.into();
        let mime = sniff_mime(&name, bytes)
            .ok_or_else(|| FlowError::UnsupportedImage(name.clone()))?;
        let data_uri = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
        Ok(Self { name, data_uri })
    }

    pub fn from_path(path: impl AsRef<Path>) -> FlowResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, &bytes)
    }

    pub fn mime(&self) -> &str {
        self.data_uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .unwrap_or_default()
    }
}

fn sniff_mime(name: &str, bytes: &[u8]) -> Option<&'static str> {
    if bytes.is_empty() {
        return None;
    }
    let format = image::guess_format(bytes).ok().or_else(|| {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
    })?;
    Some(format.to_mime_type())
}

/// One record of the classifier's JSON response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPrediction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub label_dict: BTreeMap<String, usize>,
    #[serde(default)]
    pub label_probability: Vec<f64>,
}

impl LabelPrediction {
    /// Largest entry of `label_probability`, ignoring NaN.
    pub fn max_probability(&self) -> Option<f64> {
        self.label_probability
            .iter()
            .copied()
            .filter(|p| !p.is_nan())
            .fold(None, |best, p| match best {
                Some(b) if b >= p => Some(b),
                _ => Some(p),
            })
    }
}

/// Decoded classifier answer. `None` means the server sent nothing usable.
pub type ClassifyResponse = Option<Vec<LabelPrediction>>;

/// A response record resolved against its label dictionary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub label: String,
    pub probabilities: BTreeMap<String, f64>,
    pub max_probability: f64,
}

impl ClassificationResult {
    /// Resolve a wire record. Returns `None` when the record carries no numbers.
    pub fn from_prediction(prediction: &LabelPrediction) -> Option<Self> {
        let max_probability = prediction.max_probability()?;

        let mut probabilities = BTreeMap::new();
        for (name, &index) in &prediction.label_dict {
            match prediction.label_probability.get(index) {
                Some(&p) => {
                    probabilities.insert(name.clone(), p);
                }
                None => tracing::warn!(
                    "label {name} points at index {index}, response only has {} probabilities",
                    prediction.label_probability.len()
                ),
            }
        }

        let label = prediction.label.clone().unwrap_or_else(|| {
            probabilities
                .iter()
                .filter(|(_, p)| !p.is_nan())
                .fold(None::<(&String, f64)>, |best, (name, &p)| match best {
                    Some((_, b)) if b >= p => best,
                    _ => Some((name, p)),
                })
                .map(|(name, _)| name.clone())
                .unwrap_or_default()
        });

        Some(Self {
            label,
            probabilities,
            max_probability,
        })
    }
}
