use thiserror::Error;

/// Everything that can end a request cycle, or stop the flow from starting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error("the classifier returned no predictions")]
    EmptyResponse,
    #[error("no prediction scored above zero")]
    NoWinner,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("classifier answered with HTTP {0}")]
    Status(u16),
    #[error("could not read classifier response: {0}")]
    Decode(String),
    #[error("not a supported image: {0}")]
    UnsupportedImage(String),
    #[error("invalid label name: {0:?}")]
    InvalidLabel(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(String),
}

impl FlowError {
    /// True for the errors caused by the response content rather than the transport.
    pub fn is_empty_or_invalid(&self) -> bool {
        matches!(self, FlowError::EmptyResponse | FlowError::NoWinner)
    }
}

impl From<std::io::Error> for FlowError {
    fn from(err: std::io::Error) -> Self {
        FlowError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for FlowError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FlowError::Status(status.as_u16()),
            None if err.is_decode() => FlowError::Decode(err.to_string()),
            None => FlowError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::Decode(err.to_string())
    }
}

pub type FlowResult<T> = std::result::Result<T, FlowError>;
