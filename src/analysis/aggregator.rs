//! Summary statistics over normalized results

use crate::scoring::response::ServiceSummary;
use crate::types::result::{RiskBand, RiskBandThresholds, TransactionResult};
use serde::Serialize;
use tracing::warn;

/// Service rounds its percentage to two decimals
const PERCENTAGE_TOLERANCE: f64 = 0.01;

/// Fraud count and rate from one source
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FraudTally {
    pub fraudulent_count: u64,
    pub fraud_percentage: f64,
}

/// Totals as reported by the scoring service
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServiceTally {
    pub total_transactions: u64,
    pub fraudulent_count: u64,
    pub fraud_percentage: f64,
}

impl From<ServiceSummary> for ServiceTally {
    fn from(summary: ServiceSummary) -> Self {
        Self {
            total_transactions: summary.total_transactions,
            fraudulent_count: summary.predicted_frauds,
            fraud_percentage: summary.fraud_percentage,
        }
    }
}

/// Headline numbers for one analysis.
///
/// Both fraud tallies are kept: the service may threshold differently from
/// the per-row predictions it returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub total_transactions: u64,
    /// Mean hybrid risk score; 0 for an empty set
    pub avg_risk_score: f64,
    pub client_computed: FraudTally,
    pub service_reported: Option<ServiceTally>,
}

impl SummaryStatistics {
    /// Service totals when available, otherwise the client recount
    pub fn headline(&self) -> FraudTally {
        match self.service_reported {
            Some(service) => FraudTally {
                fraudulent_count: service.fraudulent_count,
                fraud_percentage: service.fraud_percentage,
            },
            None => self.client_computed,
        }
    }

    /// Whether the service totals agree with the client recount
    pub fn is_consistent(&self) -> bool {
        match self.service_reported {
            Some(service) => {
                service.total_transactions == self.total_transactions
                    && service.fraudulent_count == self.client_computed.fraudulent_count
                    && (service.fraud_percentage - self.client_computed.fraud_percentage).abs()
                        <= PERCENTAGE_TOLERANCE
            }
            None => true,
        }
    }

    /// Band of the headline fraud rate
    pub fn fraud_rate_band(&self) -> RiskBand {
        RiskBand::above(self.headline().fraud_percentage, &RiskBandThresholds::FRAUD_RATE)
    }

    pub fn avg_risk_band(&self) -> RiskBand {
        RiskBand::above(self.avg_risk_score, &RiskBandThresholds::AVG_RISK)
    }
}

/// Fraud vs. legitimate split for the distribution chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FraudDistribution {
    pub fraud: u64,
    pub non_fraud: u64,
}

/// Computes [`SummaryStatistics`] from a result set
pub struct SummaryAggregator;

impl SummaryAggregator {
    /// Summarize results, attaching the service's own totals when present
    pub fn summarize(
        results: &[TransactionResult],
        service_summary: Option<ServiceSummary>,
    ) -> SummaryStatistics {
        let total = results.len() as u64;
        let fraudulent_count = Self::fraud_count(results);

        let summary = SummaryStatistics {
            total_transactions: total,
            avg_risk_score: Self::mean_risk_score(results),
            client_computed: FraudTally {
                fraudulent_count,
                fraud_percentage: Self::percentage(fraudulent_count, total),
            },
            service_reported: service_summary.map(ServiceTally::from),
        };

        if !summary.is_consistent() {
            warn!(
                client_total = summary.total_transactions,
                client_frauds = summary.client_computed.fraudulent_count,
                service = ?summary.service_reported,
                "Service summary disagrees with per-row predictions"
            );
        }

        summary
    }

    /// Number of results predicted as fraud
    pub fn fraud_count(results: &[TransactionResult]) -> u64 {
        results.iter().filter(|r| r.is_fraud()).count() as u64
    }

    /// `count / total * 100`, or 0 when `total` is 0
    pub fn percentage(count: u64, total: u64) -> f64 {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        }
    }

    /// Mean hybrid risk score, 0 when there are no results
    pub fn mean_risk_score(results: &[TransactionResult]) -> f64 {
        if results.is_empty() {
            return 0.0;
        }
        results.iter().map(|r| r.hybrid_risk_score).sum::<f64>() / results.len() as f64
    }

    pub fn distribution(results: &[TransactionResult]) -> FraudDistribution {
        let fraud = Self::fraud_count(results);
        FraudDistribution {
            fraud,
            non_fraud: results.len() as u64 - fraud,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::result::Prediction;

    fn result(id: u32, score: f64, fraud: bool) -> TransactionResult {
        TransactionResult {
            id,
            fraud_probability: score,
            anomaly_score: score,
            hybrid_risk_score: score,
            prediction: if fraud {
                Prediction::Fraud
            } else {
                Prediction::NonFraud
            },
            amount: None,
            time: None,
        }
    }

    #[test]
    fn test_client_summary() {
        let results = vec![
            result(1, 80.0, true),
            result(2, 10.0, false),
            result(3, 30.0, false),
            result(4, 40.0, false),
        ];

        let summary = SummaryAggregator::summarize(&results, None);

        assert_eq!(summary.total_transactions, 4);
        assert_eq!(summary.client_computed.fraudulent_count, 1);
        assert!((summary.client_computed.fraud_percentage - 25.0).abs() < 1e-9);
        assert!((summary.avg_risk_score - 40.0).abs() < 1e-9);
        assert_eq!(summary.headline(), summary.client_computed);
        assert!(summary.is_consistent());
    }

    #[test]
    fn test_empty_results() {
        let summary = SummaryAggregator::summarize(&[], None);

        assert_eq!(summary.total_transactions, 0);
        assert_eq!(summary.avg_risk_score, 0.0);
        assert_eq!(summary.client_computed.fraud_percentage, 0.0);
        assert!(!summary.avg_risk_score.is_nan());
    }

    #[test]
    fn test_service_summary_preferred_for_headline() {
        let results = vec![result(1, 55.0, true), result(2, 45.0, false)];
        let service = ServiceSummary {
            total_transactions: 2,
            predicted_frauds: 1,
            fraud_percentage: 50.0,
        };

        let summary = SummaryAggregator::summarize(&results, Some(service));

        assert_eq!(summary.headline().fraudulent_count, 1);
        assert!(summary.is_consistent());
    }

    #[test]
    fn test_divergent_sources_both_kept() {
        let results = vec![result(1, 55.0, true), result(2, 45.0, false)];
        let service = ServiceSummary {
            total_transactions: 2,
            predicted_frauds: 2,
            fraud_percentage: 100.0,
        };

        let summary = SummaryAggregator::summarize(&results, Some(service));

        assert!(!summary.is_consistent());
        assert_eq!(summary.headline().fraudulent_count, 2);
        assert_eq!(summary.client_computed.fraudulent_count, 1);
    }

    #[test]
    fn test_distribution() {
        let results = vec![result(1, 90.0, true), result(2, 5.0, false), result(3, 6.0, false)];
        let dist = SummaryAggregator::distribution(&results);

        assert_eq!(dist, FraudDistribution { fraud: 1, non_fraud: 2 });
    }

    #[test]
    fn test_card_bands() {
        let results = vec![result(1, 60.0, true), result(2, 60.0, false)];
        let summary = SummaryAggregator::summarize(&results, None);

        assert_eq!(summary.fraud_rate_band(), RiskBand::Fraud);
        assert_eq!(summary.avg_risk_band(), RiskBand::Fraud);
    }

    #[test]
    fn test_fraud_rate_band_follows_headline() {
        let results: Vec<_> = (1..=10).map(|i| result(i, 20.0, false)).collect();
        let service = ServiceSummary {
            total_transactions: 10,
            predicted_frauds: 5,
            fraud_percentage: 50.0,
        };

        let summary = SummaryAggregator::summarize(&results, Some(service));

        assert_eq!(summary.client_computed.fraud_percentage, 0.0);
        assert_eq!(summary.headline().fraudulent_count, 5);
        assert_eq!(summary.fraud_rate_band(), RiskBand::Fraud);
    }
}
