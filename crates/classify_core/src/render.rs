//! Pure projection of the flow state onto the page's display regions.

use crate::config::MAX_DECIMALS;
use crate::error::{FlowError, FlowResult};
use crate::flow::UiState;
use std::collections::{BTreeMap, HashSet};

pub const DROP_ZONE_ID: &str = "#dropz";
pub const SUBMIT_BUTTON_ID: &str = "#submitButton";
pub const RESULT_DIV_ID: &str = "#resultDiv";
pub const PROBABILITY_TABLE_ID: &str = "#probabilityTable";
pub const ERROR_ID: &str = "#error";
pub const RESULT_HOLDER_ID: &str = "#resultHolder";
pub const PROBABILITY_CELL_PREFIX: &str = "#probab_";

/// Label name to probability cell id, validated once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementMap {
    order: Vec<String>,
    cells: BTreeMap<String, String>,
}

impl ElementMap {
    pub fn new<I, S>(labels: I) -> FlowResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        for label in labels {
            let label = label.into();
            if label.is_empty() || label.chars().any(char::is_whitespace) {
                return Err(FlowError::InvalidLabel(label));
            }
            if !seen.insert(label.clone()) {
                return Err(FlowError::InvalidLabel(label));
            }
            order.push(label);
        }
        let cells = order
            .iter()
            .map(|label| (label.clone(), format!("{PROBABILITY_CELL_PREFIX}{label}")))
            .collect();
        Ok(Self { order, cells })
    }

    pub fn cell_id(&self, label: &str) -> Option<&str> {
        self.cells.get(label).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.order
    }
}

/// Content of `#resultHolder`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    pub label: String,
    pub display_name: String,
    pub confidence: String,
}

/// Why the error panel is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered, but with nothing that beat the sentinel.
    NoMatch,
    /// The request never reached the server.
    Unreachable,
    /// The server answered with a failing status or an unreadable body.
    BadAnswer,
}

impl ErrorKind {
    pub fn of(err: &FlowError) -> Self {
        match err {
            FlowError::Transport(_) => ErrorKind::Unreachable,
            err if err.is_empty_or_invalid() => ErrorKind::NoMatch,
            _ => ErrorKind::BadAnswer,
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            ErrorKind::NoMatch => "Can't classify this image. Try a clear photo of a single face.",
            ErrorKind::Unreachable => "Could not reach the classification server.",
            ErrorKind::BadAnswer => "The classification server did not return a usable answer.",
        }
    }
}

/// Everything the page needs to paint one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct View {
    pub error_visible: bool,
    pub result_visible: bool,
    pub table_visible: bool,
    pub error_message: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub result: Option<ResultCard>,
    /// `(cell id, formatted probability)` in configured label order.
    pub cells: Vec<(String, String)>,
}

impl View {
    pub fn cell(&self, id: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(cell_id, _)| cell_id == id)
            .map(|(_, text)| text.as_str())
    }
}

/// `decimals` above [`MAX_DECIMALS`] are clamped.
pub fn render(state: &UiState, elements: &ElementMap, decimals: usize) -> View {
    let decimals = decimals.min(MAX_DECIMALS);
    match state {
        UiState::Idle => View::default(),
        UiState::Error(err) => View {
            error_visible: true,
            error_message: Some(err.to_string()),
            error_kind: Some(ErrorKind::of(err)),
            ..View::default()
        },
        UiState::Success(result) => {
            let mut cells = Vec::new();
            for label in elements.labels() {
                if let (Some(id), Some(p)) = (elements.cell_id(label), result.probabilities.get(label)) {
                    cells.push((id.to_string(), format!("{p:.decimals$}")));
                }
            }
            for name in result.probabilities.keys() {
                if elements.cell_id(name).is_none() {
                    tracing::warn!("no table cell for label {name}, skipping");
                }
            }
            View {
                result_visible: true,
                table_visible: true,
                result: Some(ResultCard {
                    label: result.label.clone(),
                    display_name: display_name(&result.label),
                    confidence: format!("{:.decimals$}", result.max_probability),
                }),
                cells,
                ..View::default()
            }
        }
    }
}

/// `lionel_messi` -> `Lionel Messi`
pub fn display_name(label: &str) -> String {
    label
        .split(['_', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassificationResult;
    use rstest::rstest;

    fn elements() -> ElementMap {
        ElementMap::new(["lionel_messi", "karim_benzema"]).unwrap()
    }

    #[test]
    fn idle_hides_everything() {
        let view = render(&UiState::Idle, &elements(), 2);
        assert!(!view.error_visible && !view.result_visible && !view.table_visible);
        assert!(view.cells.is_empty());
    }

    #[test]
    fn error_shows_only_error_panel() {
        let view = render(&UiState::Error(FlowError::EmptyResponse), &elements(), 2);
        assert!(view.error_visible);
        assert!(!view.result_visible);
        assert!(!view.table_visible);
        assert_eq!(view.result, None);
        assert!(view.error_message.is_some());
        assert_eq!(view.error_kind, Some(ErrorKind::NoMatch));
    }

    #[rstest]
    #[case(FlowError::EmptyResponse, ErrorKind::NoMatch)]
    #[case(FlowError::NoWinner, ErrorKind::NoMatch)]
    #[case(FlowError::Transport("refused".into()), ErrorKind::Unreachable)]
    #[case(FlowError::Status(503), ErrorKind::BadAnswer)]
    #[case(FlowError::Decode("<html>".into()), ErrorKind::BadAnswer)]
    fn error_kind_follows_the_failure(#[case] err: FlowError, #[case] kind: ErrorKind) {
        let view = render(&UiState::Error(err), &elements(), 2);
        assert!(view.error_visible);
        assert_eq!(view.error_kind, Some(kind));
    }

    #[test]
    fn oversized_decimals_are_clamped() {
        let result = ClassificationResult {
            label: "lionel_messi".into(),
            probabilities: [("lionel_messi".to_string(), 0.5)].into_iter().collect(),
            max_probability: 0.5,
        };
        let view = render(&UiState::Success(result), &elements(), 70_000);
        assert_eq!(view.cell("#probab_lionel_messi"), Some("0.50000000"));
        assert_eq!(view.result.unwrap().confidence, "0.50000000");
    }

    #[test]
    fn success_fills_card_and_cells_in_label_order() {
        let result = ClassificationResult {
            label: "lionel_messi".into(),
            probabilities: [
                ("karim_benzema".to_string(), 0.1234),
                ("lionel_messi".to_string(), 0.8766),
                ("unknown_player".to_string(), 0.0),
            ]
            .into_iter()
            .collect(),
            max_probability: 0.8766,
        };
        let view = render(&UiState::Success(result), &elements(), 2);
        assert!(!view.error_visible && view.result_visible && view.table_visible);
        let card = view.result.as_ref().unwrap();
        assert_eq!(card.display_name, "Lionel Messi");
        assert_eq!(card.confidence, "0.88");
        assert_eq!(
            view.cells,
            vec![
                ("#probab_lionel_messi".to_string(), "0.88".to_string()),
                ("#probab_karim_benzema".to_string(), "0.12".to_string()),
            ]
        );
        assert_eq!(view.cell("#probab_karim_benzema"), Some("0.12"));
    }

    #[rstest]
    #[case(vec!["ok", ""])]
    #[case(vec!["robert lewandoski"])]
    #[case(vec!["a", "b", "a"])]
    fn element_map_rejects_bad_labels(#[case] labels: Vec<&str>) {
        assert!(matches!(ElementMap::new(labels), Err(FlowError::InvalidLabel(_))));
    }

    #[rstest]
    #[case("lionel_messi", "Lionel Messi")]
    #[case("zlatan", "Zlatan")]
    #[case("robert lewandoski", "Robert Lewandoski")]
    #[case("", "")]
    fn display_names(#[case] label: &str, #[case] expected: &str) {
        assert_eq!(display_name(label), expected);
    }
}
