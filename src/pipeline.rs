//! Pipeline driver: owns the session, the scoring service and metrics

use crate::analysis::AnalysisResults;
use crate::error::{PipelineError, PipelineResult};
use crate::ingest::{ParsedTable, TableIngestor};
use crate::metrics::PipelineMetrics;
use crate::scoring::client::ScoringService;
use crate::scoring::response::RawPredictionResponse;
use crate::session::{AnalysisTicket, Completion, Session};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// A scoring call detached from the session, so the session stays free to
/// accept a new selection while it runs
pub struct PendingAnalysis<S> {
    ticket: AnalysisTicket,
    scorer: Arc<S>,
}

/// Result of running a [`PendingAnalysis`]
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub ticket: AnalysisTicket,
    pub result: PipelineResult<RawPredictionResponse>,
    pub elapsed: Duration,
}

impl<S: ScoringService> PendingAnalysis<S> {
    pub fn ticket(&self) -> &AnalysisTicket {
        &self.ticket
    }

    /// Issue the single scoring call
    pub async fn run(self) -> AnalysisOutcome {
        let start = Instant::now();
        let result = self.scorer.analyze(&self.ticket.file).await;
        AnalysisOutcome {
            ticket: self.ticket,
            result,
            elapsed: start.elapsed(),
        }
    }
}

/// Drives one session through ingest, scoring and result derivation
pub struct Pipeline<S> {
    session: Session,
    scorer: Arc<S>,
    metrics: Arc<PipelineMetrics>,
    required_columns: Vec<String>,
}

impl<S: ScoringService> Pipeline<S> {
    pub fn new(scorer: S, ingestor: TableIngestor) -> Self {
        Self {
            session: Session::new(ingestor),
            scorer: Arc::new(scorer),
            metrics: Arc::new(PipelineMetrics::new()),
            required_columns: Vec::new(),
        }
    }

    /// Columns to check for after parsing; absence is only logged
    pub fn with_required_columns(mut self, columns: Vec<String>) -> Self {
        self.required_columns = columns;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        self.metrics.clone()
    }

    /// Select a file from its name and contents
    pub fn select_file(&mut self, name: &str, bytes: &[u8]) -> PipelineResult<&ParsedTable> {
        match self.session.select_file(name, bytes) {
            Ok(table) => {
                self.metrics.record_ingest(table.row_count());
                let missing = table.missing_columns(&self.required_columns);
                if !missing.is_empty() {
                    warn!(
                        file = %name,
                        missing = ?missing,
                        "File lacks columns the scoring service expects"
                    );
                }
                Ok(table)
            }
            Err(e) => {
                self.metrics.record_error(e.kind());
                Err(e)
            }
        }
    }

    /// Read a file from disk and select it
    pub async fn select_path(&mut self, path: &Path) -> PipelineResult<&ParsedTable> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = PipelineError::Parse(format!("failed to read {}: {}", path.display(), e));
                self.metrics.record_error(err.kind());
                return Err(err);
            }
        };

        self.select_file(&name, &bytes)
    }

    /// Start an analysis if the trigger is enabled
    pub fn start_analysis(&mut self) -> Option<PendingAnalysis<S>> {
        let ticket = self.session.begin_analysis()?;
        self.metrics.record_analysis_started();
        info!(
            file = %ticket.file.name,
            generation = ticket.generation,
            "Running fraud detection"
        );
        Some(PendingAnalysis {
            ticket,
            scorer: self.scorer.clone(),
        })
    }

    /// Apply the outcome of a scoring call to the session
    pub fn finish_analysis(&mut self, outcome: AnalysisOutcome) -> Completion {
        let failed = outcome.result.as_ref().err().map(PipelineError::kind);
        let completion = self.session.complete_analysis(&outcome.ticket, outcome.result);

        match (completion, failed) {
            (Completion::Stale, _) => self.metrics.record_stale(),
            (Completion::Accepted, Some(kind)) => {
                self.metrics.record_analysis_failed();
                self.metrics.record_error(kind);
            }
            (Completion::Accepted, None) => {
                let transactions = self
                    .session
                    .analysis()
                    .map(|a| a.summary.total_transactions)
                    .unwrap_or(0);
                self.metrics
                    .record_analysis_completed(outcome.elapsed, transactions);
            }
        }
        completion
    }

    /// Start, run and finish one analysis of the selected file
    pub async fn analyze(&mut self) -> PipelineResult<&AnalysisResults> {
        let pending = self.start_analysis().ok_or_else(|| {
            PipelineError::AnalysisFailed("no file selected or analysis already running".to_string())
        })?;

        let outcome = pending.run().await;
        self.finish_analysis(outcome);

        if let Some(error) = self.session.last_error() {
            return Err(error.clone());
        }
        self.session
            .analysis()
            .ok_or_else(|| PipelineError::AnalysisFailed("analysis was superseded".to_string()))
    }
}
