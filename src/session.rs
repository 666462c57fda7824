//! Explicit session state for one user's pipeline run.
//!
//! ```text
//! Idle ──select──▶ FileSelected ──begin──▶ Analyzing ──complete(ok)──▶ Results
//!                        ▲                     │                          │
//!                        └──────select─────────┴──────── * ──error──▶ Failed
//! ```
//!
//! Every selection and every analysis start bumps the generation. A
//! completion is applied only if its ticket still carries the current
//! generation, so a response to a superseded request is discarded.

use crate::analysis::AnalysisResults;
use crate::error::{PipelineError, PipelineResult};
use crate::ingest::{ParsedTable, TableIngestor};
use crate::scoring::client::UploadFile;
use crate::scoring::response::RawPredictionResponse;
use tracing::{debug, info, warn};

/// A validated upload and its parsed preview
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub upload: UploadFile,
    pub table: ParsedTable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    FileSelected {
        file: SelectedFile,
    },
    Analyzing {
        file: SelectedFile,
        generation: u64,
    },
    Results {
        file: SelectedFile,
        analysis: AnalysisResults,
    },
    /// Last operation failed; a previously selected file is kept so the
    /// analysis can be triggered again
    Failed {
        error: PipelineError,
        file: Option<SelectedFile>,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::FileSelected { .. } => "file_selected",
            SessionState::Analyzing { .. } => "analyzing",
            SessionState::Results { .. } => "results",
            SessionState::Failed { .. } => "failed",
        }
    }

    fn into_file(self) -> Option<SelectedFile> {
        match self {
            SessionState::Idle => None,
            SessionState::FileSelected { file }
            | SessionState::Analyzing { file, .. }
            | SessionState::Results { file, .. } => Some(file),
            SessionState::Failed { file, .. } => file,
        }
    }
}

/// Permission to run one scoring call, tied to the generation it was issued in
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisTicket {
    pub generation: u64,
    pub file: UploadFile,
}

/// What happened to a completed scoring call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Outcome applied to the session
    Accepted,
    /// A newer selection or analysis superseded the request
    Stale,
}

/// Owner of all per-user pipeline state
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    generation: u64,
    ingestor: TableIngestor,
}

impl Session {
    pub fn new(ingestor: TableIngestor) -> Self {
        Self {
            state: SessionState::Idle,
            generation: 0,
            ingestor,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Validate and parse a newly selected file, replacing all prior state.
    ///
    /// On failure the previously selected file (if any) is kept but earlier
    /// results are dropped.
    pub fn select_file(&mut self, name: &str, bytes: &[u8]) -> PipelineResult<&ParsedTable> {
        self.generation += 1;
        let previous = std::mem::replace(&mut self.state, SessionState::Idle);

        match self.ingestor.ingest(name, bytes) {
            Ok(table) => {
                info!(
                    file = %name,
                    rows = table.row_count(),
                    columns = table.columns.len(),
                    generation = self.generation,
                    "File selected"
                );
                self.state = SessionState::FileSelected {
                    file: SelectedFile {
                        upload: UploadFile::new(name, bytes.to_vec()),
                        table,
                    },
                };
                self.table().ok_or_else(|| {
                    PipelineError::Parse(format!("selection of {} was not retained", name))
                })
            }
            Err(error) => {
                warn!(file = %name, error = %error, "File rejected");
                self.state = SessionState::Failed {
                    error: error.clone(),
                    file: previous.into_file(),
                };
                Err(error)
            }
        }
    }

    /// Whether the analysis trigger is enabled
    pub fn can_analyze(&self) -> bool {
        matches!(
            self.state,
            SessionState::FileSelected { .. }
                | SessionState::Results { .. }
                | SessionState::Failed { file: Some(_), .. }
        )
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, SessionState::Analyzing { .. })
    }

    /// Move into `Analyzing` and hand out a ticket; `None` while a call is
    /// already outstanding or no file is selected
    pub fn begin_analysis(&mut self) -> Option<AnalysisTicket> {
        if !self.can_analyze() {
            debug!(state = self.state.name(), "Analysis trigger disabled");
            return None;
        }

        let file = std::mem::replace(&mut self.state, SessionState::Idle).into_file()?;
        self.generation += 1;
        let ticket = AnalysisTicket {
            generation: self.generation,
            file: file.upload.clone(),
        };

        debug!(file = %file.upload.name, generation = self.generation, "Analysis started");
        self.state = SessionState::Analyzing {
            file,
            generation: self.generation,
        };
        Some(ticket)
    }

    /// Apply a scoring outcome if the ticket is still current
    pub fn complete_analysis(
        &mut self,
        ticket: &AnalysisTicket,
        outcome: PipelineResult<RawPredictionResponse>,
    ) -> Completion {
        let current = matches!(
            self.state,
            SessionState::Analyzing { generation, .. } if generation == ticket.generation
        );
        if !current {
            warn!(
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                file = %ticket.file.name,
                "Discarding stale analysis response"
            );
            return Completion::Stale;
        }

        let Some(file) = std::mem::replace(&mut self.state, SessionState::Idle).into_file() else {
            return Completion::Stale;
        };

        self.state = match outcome {
            Ok(response) => {
                let analysis = AnalysisResults::from_response(&file.upload.name, &response);
                info!(
                    run_id = %analysis.run_id,
                    file = %file.upload.name,
                    transactions = analysis.summary.total_transactions,
                    frauds = analysis.summary.client_computed.fraudulent_count,
                    "Analysis complete"
                );
                SessionState::Results { file, analysis }
            }
            Err(error) => {
                warn!(file = %file.upload.name, error = %error, "Analysis failed");
                SessionState::Failed {
                    error,
                    file: Some(file),
                }
            }
        };
        Completion::Accepted
    }

    /// Abandon an outstanding analysis; its response will be discarded
    pub fn cancel_analysis(&mut self) -> bool {
        if !self.is_analyzing() {
            return false;
        }
        self.generation += 1;
        if let Some(file) = std::mem::replace(&mut self.state, SessionState::Idle).into_file() {
            self.state = SessionState::FileSelected { file };
        }
        info!(generation = self.generation, "Analysis cancelled");
        true
    }

    /// Drop everything and return to `Idle`
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SessionState::Idle;
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::FileSelected { file }
            | SessionState::Analyzing { file, .. }
            | SessionState::Results { file, .. } => Some(file),
            SessionState::Failed { file, .. } => file.as_ref(),
        }
    }

    /// Parsed preview of the selected file
    pub fn table(&self) -> Option<&ParsedTable> {
        self.selected_file().map(|f| &f.table)
    }

    pub fn analysis(&self) -> Option<&AnalysisResults> {
        match &self.state {
            SessionState::Results { analysis, .. } => Some(analysis),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&PipelineError> {
        match &self.state {
            SessionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(TableIngestor::default())
    }
}
