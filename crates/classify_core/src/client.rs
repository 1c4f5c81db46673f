use crate::config::AppConfig;
use crate::error::FlowResult;
use crate::model::{ClassifyResponse, LabelPrediction};
use std::sync::Mutex;
use std::time::Duration;

/// Form field carrying the data URI.
pub const IMAGE_DATA_FIELD: &str = "image_data";

pub trait Classifier {
    fn classify(&self, image_data: &str) -> FlowResult<ClassifyResponse>;
}

/// Talks to the classification server over HTTP.
pub struct HttpClassifier {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(config: &AppConfig) -> FlowResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("scout/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self {
            client,
            url: config.classify_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Classifier for HttpClassifier {
    fn classify(&self, image_data: &str) -> FlowResult<ClassifyResponse> {
        tracing::debug!("POST {} ({} bytes)", self.url, image_data.len());
        let response = self
            .client
            .post(&self.url)
            .form(&[(IMAGE_DATA_FIELD, image_data)])
            .send()?
            .error_for_status()?;
        let body = response.text()?;
        decode_body(&body)
    }
}

/// Decode the endpoint's body. Blank bodies and JSON `null` count as an absent answer.
pub fn decode_body(body: &str) -> FlowResult<ClassifyResponse> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let records: Option<Vec<LabelPrediction>> = serde_json::from_str(trimmed)?;
    Ok(records)
}

/// Answers every request with the same canned response and remembers what it was sent.
#[derive(Debug)]
pub struct FakeClassifier {
    response: FlowResult<ClassifyResponse>,
    requests: Mutex<Vec<String>>,
}

impl FakeClassifier {
    pub fn new(response: FlowResult<ClassifyResponse>) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Canned answer crowning `label` with `confidence`, spread over `labels`.
    pub fn with_winner(labels: &[String], label: &str, confidence: f64) -> Self {
        let others = labels.len().saturating_sub(1).max(1) as f64;
        let label_dict = labels
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        let label_probability = labels
            .iter()
            .map(|name| {
                if name == label {
                    confidence
                } else {
                    (1.0 - confidence) / others
                }
            })
            .collect();
        Self::new(Ok(Some(vec![LabelPrediction {
            label: Some(label.to_string()),
            label_dict,
            label_probability,
        }])))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Classifier for FakeClassifier {
    fn classify(&self, image_data: &str) -> FlowResult<ClassifyResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(image_data.to_string());
        }
        self.response.clone()
    }
}
