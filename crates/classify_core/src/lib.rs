//! Upload one image, ask the classification server about it, show the best match.

pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod model;
pub mod queue;
pub mod render;
pub mod runtime;
pub mod winner;

pub use client::{Classifier, FakeClassifier, HttpClassifier, decode_body};
pub use config::{AppConfig, CLASSIFY_PATH};
pub use error::{FlowError, FlowResult};
pub use flow::{Effect, Flow, Msg, RequestToken, UiState, transition};
pub use model::{ClassificationResult, ClassifyResponse, LabelPrediction, SelectedFile};
pub use queue::FileQueue;
pub use render::{ElementMap, ErrorKind, ResultCard, View, display_name, render};
pub use runtime::FlowRuntime;
pub use winner::{resolve_response, select_winner};
