use crate::error::{FlowError, FlowResult};
use crate::model::{ClassificationResult, ClassifyResponse, LabelPrediction};

/// Score a record has to beat to be picked at all.
pub const WINNER_SENTINEL: f64 = 0.0;

/// Pick the record with the highest per-record maximum probability.
///
/// Single linear scan with strict `>`, so the first of several equal records wins.
/// Records with no probabilities, only non-positive ones or only NaN never beat the
/// sentinel; if nothing does, the result is `None`.
pub fn select_winner(records: &[LabelPrediction]) -> Option<&LabelPrediction> {
    let mut winner = None;
    let mut best = WINNER_SENTINEL;
    for record in records {
        if let Some(score) = record.max_probability()
            && score > best
        {
            best = score;
            winner = Some(record);
        }
    }
    winner
}

/// Turn a decoded response into the winning result, or the reason there is none.
pub fn resolve_response(response: &ClassifyResponse) -> FlowResult<ClassificationResult> {
    let records = match response {
        Some(records) if !records.is_empty() => records,
        _ => return Err(FlowError::EmptyResponse),
    };
    select_winner(records)
        .and_then(ClassificationResult::from_prediction)
        .ok_or(FlowError::NoWinner)
}
