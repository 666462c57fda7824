//! Wire format of the scoring service response

use serde::{Deserialize, Serialize};

/// Body returned by `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPredictionResponse {
    pub predictions: Vec<RawPrediction>,

    #[serde(default)]
    pub summary: Option<ServiceSummary>,
}

/// One scored row as the service reports it.
///
/// The service echoes the submitted columns alongside the scores; only the
/// fields below are read, the rest are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    #[serde(rename = "Fraud Probability (%)")]
    pub fraud_probability: f64,

    #[serde(rename = "Anomaly Score (%)")]
    pub anomaly_score: f64,

    #[serde(rename = "Hybrid Risk Score (%)")]
    pub hybrid_risk_score: f64,

    /// 1 = fraud, 0 = legitimate
    #[serde(rename = "Prediction", default)]
    pub prediction: Option<f64>,

    #[serde(rename = "Amount", default)]
    pub amount: Option<f64>,

    #[serde(rename = "Time", default)]
    pub time: Option<f64>,
}

/// Totals computed by the service itself
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub total_transactions: u64,
    pub predicted_frauds: u64,
    pub fraud_percentage: f64,
}

/// Error body sent by the service on 4xx/5xx
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceErrorBody {
    pub detail: String,
}

/// Body returned by the health endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}
