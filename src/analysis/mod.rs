//! Post-scoring stages: normalization, summaries, binning, paging, export

pub mod aggregator;
pub mod exporter;
pub mod histogram;
pub mod normalizer;
pub mod paginator;

pub use aggregator::{FraudDistribution, FraudTally, ServiceTally, SummaryAggregator, SummaryStatistics};
pub use histogram::{Bin, HistogramBins};
pub use paginator::{PageView, PAGE_SIZE};

use crate::scoring::response::RawPredictionResponse;
use crate::types::result::TransactionResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Results and summary of one successful analysis, created together and
/// replaced together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResults {
    /// Unique identifier of the analysis run
    pub run_id: String,
    pub file_name: String,
    pub analyzed_at: DateTime<Utc>,
    pub results: Vec<TransactionResult>,
    pub summary: SummaryStatistics,
}

impl AnalysisResults {
    /// Normalize and summarize a service response
    pub fn from_response(file_name: &str, response: &RawPredictionResponse) -> Self {
        let results = normalizer::normalize(&response.predictions);
        let summary = SummaryAggregator::summarize(&results, response.summary);

        Self {
            run_id: Uuid::new_v4().to_string(),
            file_name: file_name.to_string(),
            analyzed_at: Utc::now(),
            results,
            summary,
        }
    }

    pub fn histogram(&self) -> HistogramBins {
        histogram::bin(&self.results)
    }

    pub fn distribution(&self) -> FraudDistribution {
        SummaryAggregator::distribution(&self.results)
    }

    pub fn page(&self, page_number: usize) -> &[TransactionResult] {
        paginator::page(&self.results, page_number)
    }

    pub fn view(&self, page_number: usize) -> PageView<'_> {
        paginator::view(&self.results, page_number)
    }

    pub fn total_pages(&self) -> usize {
        paginator::total_pages(self.results.len())
    }

    pub fn export(&self) -> String {
        exporter::export(&self.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::response::{RawPrediction, ServiceSummary};

    fn response(scores: &[(f64, f64)]) -> RawPredictionResponse {
        RawPredictionResponse {
            predictions: scores
                .iter()
                .map(|&(score, code)| RawPrediction {
                    fraud_probability: score,
                    anomaly_score: score,
                    hybrid_risk_score: score,
                    prediction: Some(code),
                    amount: Some(score * 2.0),
                    time: None,
                })
                .collect(),
            summary: Some(ServiceSummary {
                total_transactions: scores.len() as u64,
                predicted_frauds: scores.iter().filter(|(_, c)| *c == 1.0).count() as u64,
                fraud_percentage: 50.0,
            }),
        }
    }

    #[test]
    fn test_from_response() {
        let analysis = AnalysisResults::from_response("tx.csv", &response(&[(90.0, 1.0), (10.0, 0.0)]));

        assert_eq!(analysis.file_name, "tx.csv");
        assert_eq!(analysis.results.len(), 2);
        assert_eq!(analysis.summary.total_transactions, 2);
        assert!(analysis.summary.is_consistent());
        assert_eq!(analysis.histogram().counts(), [1, 0, 0, 0, 1]);
        assert_eq!(analysis.distribution().fraud, 1);
        assert_eq!(analysis.total_pages(), 1);
        assert_eq!(analysis.page(1).len(), 2);
        assert_eq!(analysis.export().lines().count(), 3);
    }

    #[test]
    fn test_run_ids_differ() {
        let a = AnalysisResults::from_response("a.csv", &response(&[(1.0, 0.0)]));
        let b = AnalysisResults::from_response("a.csv", &response(&[(1.0, 0.0)]));
        assert_ne!(a.run_id, b.run_id);
    }
}
