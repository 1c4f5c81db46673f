//! Upload-to-result flow as a pure state machine.
//!
//! `transition` never performs I/O; it returns the effects the runtime has to run.

use crate::error::FlowError;
use crate::model::{ClassificationResult, ClassifyResponse, SelectedFile};
use crate::queue::FileQueue;
use crate::winner::resolve_response;
use std::fmt;

/// Tags one classify request so late answers to older requests can be dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum UiState {
    #[default]
    Idle,
    Success(ClassificationResult),
    Error(FlowError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flow {
    pub queue: FileQueue,
    pub ui: UiState,
    /// Token of the request currently in flight.
    pub pending: Option<RequestToken>,
    pub last_token: RequestToken,
}

impl Flow {
    pub fn can_submit(&self) -> bool {
        self.pending.is_none() && !self.queue.is_empty()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    FileAdded(SelectedFile),
    /// The remove link of the drop surface.
    FileRemoved,
    SubmitClicked,
    UploadComplete(SelectedFile),
    ClassificationResponse {
        token: RequestToken,
        response: Result<ClassifyResponse, FlowError>,
    },
}

impl Msg {
    /// Debug form without the image payload.
    pub fn to_display_string(&self) -> String {
        match self {
            Msg::FileAdded(file) => format!("FileAdded({})", file.name),
            Msg::UploadComplete(file) => format!("UploadComplete({})", file.name),
            Msg::ClassificationResponse { token, response } => match response {
                Ok(Some(records)) => format!("ClassificationResponse({token}, {} records)", records.len()),
                Ok(None) => format!("ClassificationResponse({token}, absent)"),
                Err(err) => format!("ClassificationResponse({token}, {err})"),
            },
            msg => format!("{msg:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the drop surface to process its queue; it answers with `Msg::UploadComplete`.
    ProcessQueue,
    PostClassify {
        token: RequestToken,
        image_data: String,
    },
}

impl Effect {
    pub fn to_display_string(&self) -> String {
        match self {
            Effect::PostClassify { token, image_data } => {
                format!("PostClassify({token}, {} bytes)", image_data.len())
            }
            effect => format!("{effect:?}"),
        }
    }
}

pub fn init() -> (Flow, Vec<Effect>) {
    (Flow::default(), vec![])
}

pub fn transition(mut flow: Flow, msg: Msg) -> (Flow, Vec<Effect>) {
    match msg {
        Msg::FileAdded(file) => {
            if let Some(evicted) = flow.queue.add(file) {
                tracing::debug!("replaced queued file {}", evicted.name);
            }
            (flow, vec![])
        }

        Msg::FileRemoved => {
            if let Some(removed) = flow.queue.clear() {
                tracing::debug!("removed queued file {}", removed.name);
            }
            (flow, vec![])
        }

        Msg::SubmitClicked => {
            if flow.is_busy() {
                tracing::debug!("submit ignored, request {:?} still pending", flow.pending);
                return (flow, vec![]);
            }
            if flow.queue.is_empty() {
                tracing::debug!("submit ignored, no file queued");
                return (flow, vec![]);
            }
            (flow, vec![Effect::ProcessQueue])
        }

        Msg::UploadComplete(file) => {
            if flow.is_busy() {
                tracing::debug!("upload of {} ignored, request already pending", file.name);
                return (flow, vec![]);
            }
            let token = RequestToken(flow.last_token.0 + 1);
            flow.last_token = token;
            flow.pending = Some(token);
            tracing::info!("submitting {} as request {token}", file.name);
            (
                flow,
                vec![Effect::PostClassify {
                    token,
                    image_data: file.data_uri,
                }],
            )
        }

        Msg::ClassificationResponse { token, response } => {
            if flow.pending != Some(token) {
                tracing::debug!("dropping stale response for request {token}");
                return (flow, vec![]);
            }
            flow.pending = None;
            flow.ui = match response.and_then(|r| resolve_response(&r)) {
                Ok(result) => {
                    tracing::info!(
                        "request {token}: winner {} ({:.4})",
                        result.label,
                        result.max_probability
                    );
                    UiState::Success(result)
                }
                Err(err) => {
                    tracing::warn!("request {token} failed: {err}");
                    UiState::Error(err)
                }
            };
            (flow, vec![])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LabelPrediction;

    fn file(name: &str) -> SelectedFile {
        SelectedFile {
            name: name.to_string(),
            data_uri: format!("data:image/png;base64,{name}"),
        }
    }

    fn record(label: &str, probs: &[f64]) -> LabelPrediction {
        LabelPrediction {
            label: Some(label.to_string()),
            label_dict: Default::default(),
            label_probability: probs.to_vec(),
        }
    }

    /// Drive the flow through add -> submit -> upload and return the posted token.
    fn submitted(name: &str) -> (Flow, RequestToken) {
        let (flow, _) = init();
        let (flow, _) = transition(flow, Msg::FileAdded(file(name)));
        let (flow, effects) = transition(flow, Msg::SubmitClicked);
        assert_eq!(effects, vec![Effect::ProcessQueue]);
        let (flow, effects) = transition(flow, Msg::UploadComplete(file(name)));
        match effects.as_slice() {
            [Effect::PostClassify { token, image_data }] => {
                assert_eq!(image_data, &file(name).data_uri);
                (flow, *token)
            }
            other => panic!("unexpected effects {other:?}"),
        }
    }

    #[test]
    fn adding_files_never_posts() {
        let (mut flow, _) = init();
        for name in ["a", "b", "c"] {
            let (next, effects) = transition(flow, Msg::FileAdded(file(name)));
            assert!(effects.is_empty());
            flow = next;
        }
        assert_eq!(flow.queue.len(), 1);
        assert_eq!(flow.queue.current(), Some(&file("c")));
        assert_eq!(flow.ui, UiState::Idle);
    }

    #[test]
    fn removing_the_file_disables_submit() {
        let (flow, _) = init();
        let (flow, _) = transition(flow, Msg::FileAdded(file("a")));
        assert!(flow.can_submit());
        let (flow, effects) = transition(flow, Msg::FileRemoved);
        assert!(effects.is_empty());
        assert!(flow.queue.is_empty());
        assert!(!flow.can_submit());
        let (_, effects) = transition(flow, Msg::SubmitClicked);
        assert!(effects.is_empty());
    }

    #[test]
    fn removing_while_pending_keeps_the_request() {
        let (flow, token) = submitted("a");
        let (flow, _) = transition(flow, Msg::FileRemoved);
        assert_eq!(flow.pending, Some(token));
        let (flow, _) = transition(
            flow,
            Msg::ClassificationResponse {
                token,
                response: Ok(Some(vec![record("a", &[0.7])])),
            },
        );
        assert!(matches!(flow.ui, UiState::Success(_)));
    }

    #[test]
    fn submit_without_file_does_nothing() {
        let (flow, _) = init();
        let (flow, effects) = transition(flow, Msg::SubmitClicked);
        assert!(effects.is_empty());
        assert_eq!(flow.pending, None);
    }

    #[test]
    fn winning_response_moves_to_success() {
        let (flow, token) = submitted("a");
        assert!(flow.is_busy());
        let response = Ok(Some(vec![record("a", &[0.2, 0.9]), record("b", &[0.95])]));
        let (flow, effects) = transition(flow, Msg::ClassificationResponse { token, response });
        assert!(effects.is_empty());
        assert_eq!(flow.pending, None);
        match flow.ui {
            UiState::Success(result) => assert_eq!(result.label, "b"),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn empty_response_moves_to_error() {
        let (flow, token) = submitted("a");
        let (flow, _) = transition(
            flow,
            Msg::ClassificationResponse {
                token,
                response: Ok(Some(vec![])),
            },
        );
        assert_eq!(flow.ui, UiState::Error(FlowError::EmptyResponse));
    }

    #[test]
    fn zero_confidence_response_moves_to_error() {
        let (flow, token) = submitted("a");
        let (flow, _) = transition(
            flow,
            Msg::ClassificationResponse {
                token,
                response: Ok(Some(vec![record("a", &[0.0])])),
            },
        );
        assert_eq!(flow.ui, UiState::Error(FlowError::NoWinner));
    }

    #[test]
    fn transport_failure_moves_to_error() {
        let (flow, token) = submitted("a");
        let (flow, _) = transition(
            flow,
            Msg::ClassificationResponse {
                token,
                response: Err(FlowError::Status(502)),
            },
        );
        assert_eq!(flow.ui, UiState::Error(FlowError::Status(502)));
        assert!(!flow.is_busy());
    }

    #[test]
    fn resubmission_is_blocked_while_pending() {
        let (flow, _) = submitted("a");
        let (flow, effects) = transition(flow, Msg::SubmitClicked);
        assert!(effects.is_empty());
        let (_, effects) = transition(flow, Msg::UploadComplete(file("a")));
        assert!(effects.is_empty());
    }

    #[test]
    fn stale_response_is_discarded() {
        let (flow, token) = submitted("a");
        let stale = RequestToken(token.0 + 41);
        let (flow, _) = transition(
            flow,
            Msg::ClassificationResponse {
                token: stale,
                response: Ok(Some(vec![record("x", &[0.99])])),
            },
        );
        assert_eq!(flow.ui, UiState::Idle);
        assert_eq!(flow.pending, Some(token));
    }

    #[test]
    fn next_cycle_uses_a_fresh_token() {
        let (flow, first) = submitted("a");
        let (flow, _) = transition(
            flow,
            Msg::ClassificationResponse {
                token: first,
                response: Ok(None),
            },
        );
        let (flow, effects) = transition(flow, Msg::SubmitClicked);
        assert_eq!(effects, vec![Effect::ProcessQueue]);
        let (flow, effects) = transition(flow, Msg::UploadComplete(file("a")));
        let second = flow.pending.unwrap();
        assert!(second > first);
        assert!(matches!(effects.as_slice(), [Effect::PostClassify { token, .. }] if *token == second));

        // the old answer arriving again must not touch the new cycle
        let (flow, _) = transition(
            flow,
            Msg::ClassificationResponse {
                token: first,
                response: Ok(Some(vec![record("late", &[0.9])])),
            },
        );
        assert_eq!(flow.ui, UiState::Error(FlowError::EmptyResponse));
        assert_eq!(flow.pending, Some(second));
    }

    #[test]
    fn display_strings_hide_payload() {
        let effect = Effect::PostClassify {
            token: RequestToken(3),
            image_data: "data:image/png;base64,AAAA".into(),
        };
        assert_eq!(effect.to_display_string(), "PostClassify(#3, 26 bytes)");
        assert_eq!(Msg::FileAdded(file("a")).to_display_string(), "FileAdded(a)");
    }
}
