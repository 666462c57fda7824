//! Normalized per-transaction scoring results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary verdict derived from the service's prediction code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    #[serde(rename = "Fraud")]
    Fraud,
    #[serde(rename = "Non-Fraud")]
    NonFraud,
}

impl Prediction {
    /// `Fraud` iff the raw code equals 1; anything else, including absence, is `NonFraud`
    pub fn from_code(code: Option<f64>) -> Self {
        match code {
            Some(c) if c == 1.0 => Prediction::Fraud,
            _ => Prediction::NonFraud,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Prediction::Fraud => "Fraud",
            Prediction::NonFraud => "Non-Fraud",
        }
    }

    pub fn is_fraud(&self) -> bool {
        matches!(self, Prediction::Fraud)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical scoring result for one submitted row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionResult {
    /// 1-based position in the submitted file
    pub id: u32,

    /// Supervised model probability (percent)
    pub fraud_probability: f64,

    /// Unsupervised anomaly score (percent)
    pub anomaly_score: f64,

    /// Blend of the two scores above (percent)
    pub hybrid_risk_score: f64,

    pub prediction: Prediction,

    pub amount: Option<f64>,

    pub time: Option<f64>,
}

impl TransactionResult {
    pub fn is_fraud(&self) -> bool {
        self.prediction.is_fraud()
    }

    /// Colour band for the hybrid score
    pub fn risk_band(&self) -> RiskBand {
        RiskBand::from_score(self.hybrid_risk_score, &RiskBandThresholds::SCORE)
    }
}

/// Display band for a percentage-scale metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Safe,
    Warning,
    Fraud,
}

impl RiskBand {
    /// Determine band from a percentage value and inclusive lower bounds
    pub fn from_score(score: f64, thresholds: &RiskBandThresholds) -> Self {
        if score >= thresholds.fraud {
            RiskBand::Fraud
        } else if score >= thresholds.warning {
            RiskBand::Warning
        } else {
            RiskBand::Safe
        }
    }

    /// Determine band using strict lower bounds (summary cards compare with `>`)
    pub fn above(value: f64, thresholds: &RiskBandThresholds) -> Self {
        if value > thresholds.fraud {
            RiskBand::Fraud
        } else if value > thresholds.warning {
            RiskBand::Warning
        } else {
            RiskBand::Safe
        }
    }
}

/// Band boundaries on the percent scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBandThresholds {
    pub warning: f64,
    pub fraud: f64,
}

impl RiskBandThresholds {
    /// Per-score colouring in the results table
    pub const SCORE: Self = Self {
        warning: 40.0,
        fraud: 70.0,
    };

    /// Fraud-rate summary card
    pub const FRAUD_RATE: Self = Self {
        warning: 1.0,
        fraud: 5.0,
    };

    /// Average-risk summary card
    pub const AVG_RISK: Self = Self {
        warning: 25.0,
        fraud: 50.0,
    };
}

impl Default for RiskBandThresholds {
    fn default() -> Self {
        Self::SCORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_score(score: f64) -> TransactionResult {
        TransactionResult {
            id: 1,
            fraud_probability: score,
            anomaly_score: score,
            hybrid_risk_score: score,
            prediction: Prediction::NonFraud,
            amount: None,
            time: None,
        }
    }

    #[test]
    fn test_prediction_from_code() {
        assert_eq!(Prediction::from_code(Some(1.0)), Prediction::Fraud);
        assert_eq!(Prediction::from_code(Some(0.0)), Prediction::NonFraud);
        assert_eq!(Prediction::from_code(Some(2.0)), Prediction::NonFraud);
        assert_eq!(Prediction::from_code(None), Prediction::NonFraud);
    }

    #[test]
    fn test_prediction_labels() {
        assert_eq!(Prediction::Fraud.to_string(), "Fraud");
        assert_eq!(Prediction::NonFraud.to_string(), "Non-Fraud");
        assert_eq!(
            serde_json::to_string(&Prediction::NonFraud).unwrap(),
            "\"Non-Fraud\""
        );
    }

    #[test]
    fn test_risk_band_from_score() {
        assert_eq!(result_with_score(10.0).risk_band(), RiskBand::Safe);
        assert_eq!(result_with_score(40.0).risk_band(), RiskBand::Warning);
        assert_eq!(result_with_score(69.9).risk_band(), RiskBand::Warning);
        assert_eq!(result_with_score(70.0).risk_band(), RiskBand::Fraud);
    }

    #[test]
    fn test_summary_card_bands_are_strict() {
        let t = RiskBandThresholds::FRAUD_RATE;
        assert_eq!(RiskBand::above(1.0, &t), RiskBand::Safe);
        assert_eq!(RiskBand::above(1.5, &t), RiskBand::Warning);
        assert_eq!(RiskBand::above(5.0, &t), RiskBand::Warning);
        assert_eq!(RiskBand::above(5.01, &t), RiskBand::Fraud);
    }
}
