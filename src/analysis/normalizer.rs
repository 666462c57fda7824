//! Mapping of raw service predictions into canonical results

use crate::scoring::response::RawPrediction;
use crate::types::result::{Prediction, TransactionResult};
use tracing::warn;

/// Normalize the service's prediction array, preserving order.
///
/// `id` is the 1-based position in the array. Percentage fields are passed
/// through unchanged; values outside `[0, 100]` are only logged.
pub fn normalize(predictions: &[RawPrediction]) -> Vec<TransactionResult> {
    predictions
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let id = (i + 1) as u32;
            warn_out_of_range(id, "fraud_probability", raw.fraud_probability);
            warn_out_of_range(id, "anomaly_score", raw.anomaly_score);
            warn_out_of_range(id, "hybrid_risk_score", raw.hybrid_risk_score);

            TransactionResult {
                id,
                fraud_probability: raw.fraud_probability,
                anomaly_score: raw.anomaly_score,
                hybrid_risk_score: raw.hybrid_risk_score,
                prediction: Prediction::from_code(raw.prediction),
                amount: raw.amount,
                time: raw.time,
            }
        })
        .collect()
}

fn warn_out_of_range(id: u32, field: &'static str, value: f64) {
    if !(0.0..=100.0).contains(&value) {
        warn!(id, field, value, "Percentage outside [0, 100] passed through");
    }
}
