//! Session counters and latency tracking for the scoring pipeline.

use crate::analysis::{HistogramBins, SummaryStatistics};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use tracing::{info, warn};

/// Metrics collector for pipeline activity
pub struct PipelineMetrics {
    /// Files that passed validation and parsing
    pub files_ingested: AtomicU64,
    /// Data rows across all ingested files
    pub rows_ingested: AtomicU64,
    /// Scoring calls issued
    pub analyses_started: AtomicU64,
    /// Scoring calls whose results were applied
    pub analyses_completed: AtomicU64,
    /// Scoring calls that failed
    pub analyses_failed: AtomicU64,
    /// Responses dropped because a newer request superseded them
    pub stale_discarded: AtomicU64,
    /// Transactions scored across all applied analyses
    pub transactions_scored: AtomicU64,
    /// Errors by kind
    errors_by_kind: RwLock<HashMap<&'static str, u64>>,
    /// Scoring call latencies (in milliseconds)
    analysis_times: RwLock<Vec<u64>>,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            files_ingested: AtomicU64::new(0),
            rows_ingested: AtomicU64::new(0),
            analyses_started: AtomicU64::new(0),
            analyses_completed: AtomicU64::new(0),
            analyses_failed: AtomicU64::new(0),
            stale_discarded: AtomicU64::new(0),
            transactions_scored: AtomicU64::new(0),
            errors_by_kind: RwLock::new(HashMap::new()),
            analysis_times: RwLock::new(Vec::with_capacity(64)),
        }
    }

    pub fn record_ingest(&self, rows: usize) {
        self.files_ingested.fetch_add(1, Ordering::Relaxed);
        self.rows_ingested.fetch_add(rows as u64, Ordering::Relaxed);
    }

    pub fn record_analysis_started(&self) {
        self.analyses_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an applied analysis and how long the scoring call took
    pub fn record_analysis_completed(&self, elapsed: Duration, transactions: u64) {
        self.analyses_completed.fetch_add(1, Ordering::Relaxed);
        self.transactions_scored.fetch_add(transactions, Ordering::Relaxed);

        if let Ok(mut times) = self.analysis_times.write() {
            times.push(elapsed.as_millis() as u64);
            // Keep only the most recent 1000
            if times.len() > 1000 {
                times.drain(0..500);
            }
        }
    }

    pub fn record_analysis_failed(&self) {
        self.analyses_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale(&self) {
        self.stale_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a surfaced error by its kind label
    pub fn record_error(&self, kind: &'static str) {
        if let Ok(mut by_kind) = self.errors_by_kind.write() {
            *by_kind.entry(kind).or_insert(0) += 1;
        }
    }

    pub fn get_errors_by_kind(&self) -> HashMap<&'static str, u64> {
        self.errors_by_kind
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Scoring latency statistics
    pub fn get_latency_stats(&self) -> LatencyStats {
        let Ok(times) = self.analysis_times.read() else {
            return LatencyStats::default();
        };
        if times.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();

        LatencyStats {
            count: count as u64,
            mean_ms: sum / count as u64,
            p50_ms: sorted[count / 2],
            max_ms: sorted[count - 1],
        }
    }

    /// Log a summary of session activity
    pub fn print_summary(&self) {
        let started = self.analyses_started.load(Ordering::Relaxed);
        let failed = self.analyses_failed.load(Ordering::Relaxed);
        let failure_rate = if started > 0 {
            failed as f64 / started as f64 * 100.0
        } else {
            0.0
        };
        let latency = self.get_latency_stats();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              FRAUDSHIELD PIPELINE - SESSION SUMMARY          ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Files Ingested: {:>8}  │  Rows Ingested: {:>12}      ║",
            self.files_ingested.load(Ordering::Relaxed),
            self.rows_ingested.load(Ordering::Relaxed)
        );
        info!(
            "║ Analyses: {:>4} started, {:>4} applied, {:>4} failed ({:>5.1}%)  ║",
            started,
            self.analyses_completed.load(Ordering::Relaxed),
            failed,
            failure_rate
        );
        info!(
            "║ Stale Responses Discarded: {:>6}                            ║",
            self.stale_discarded.load(Ordering::Relaxed)
        );
        info!(
            "║ Scoring Latency (ms): mean={:>6} p50={:>6} max={:>6}        ║",
            latency.mean_ms, latency.p50_ms, latency.max_ms
        );

        let errors = self.get_errors_by_kind();
        if !errors.is_empty() {
            info!("╠══════════════════════════════════════════════════════════════╣");
            info!("║ Errors by Kind:                                              ║");
            for (kind, count) in &errors {
                info!("║   {:20}: {:>6}                                ║", kind, count);
            }
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoring call latency statistics
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_ms: u64,
    pub p50_ms: u64,
    pub max_ms: u64,
}

/// Log the four summary cards
pub fn log_summary_cards(summary: &SummaryStatistics) {
    let headline = summary.headline();
    info!(
        total_transactions = summary.total_transactions,
        fraud_detected = headline.fraudulent_count,
        fraud_rate = format!("{:.2}%", headline.fraud_percentage),
        fraud_rate_band = ?summary.fraud_rate_band(),
        avg_risk_score = format!("{:.1}%", summary.avg_risk_score),
        avg_risk_band = ?summary.avg_risk_band(),
        "Analysis summary"
    );

    if !summary.is_consistent() {
        warn!(
            client_fraud_detected = summary.client_computed.fraudulent_count,
            client_fraud_rate = format!("{:.2}%", summary.client_computed.fraud_percentage),
            "Client recount differs from service totals"
        );
    }
}

/// Log the risk score histogram as a bar chart
pub fn log_histogram(bins: &HistogramBins) {
    let total = bins.total();
    info!("Risk Score Distribution:");
    for bin in bins.iter() {
        let pct = if total > 0 {
            bin.count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let bar: String = "█".repeat(((pct / 2.0) as usize).min(50));
        info!("  {:>8}: {:>8} ({:>5.1}%) {}", bin.range, bin.count, pct, bar);
    }
}
