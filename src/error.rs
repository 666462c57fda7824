//! Error taxonomy for the client pipeline

use thiserror::Error;

/// Result alias used across the pipeline stages
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Every failure the pipeline can surface to the user.
///
/// All variants are terminal for the operation that raised them and none are
/// fatal to the session: the next file selection or analysis clears them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Selected file does not carry the expected extension
    #[error("invalid file type: {file_name} (expected {expected})")]
    InvalidFileType { file_name: String, expected: String },

    /// Input has a header but no data rows, or nothing at all
    #[error("file is empty or has no data rows")]
    EmptyData,

    /// Text could not be split into a usable table
    #[error("failed to parse file: {0}")]
    Parse(String),

    /// Transport, status or decode failure while talking to the scoring service
    #[error("analysis failed: {0}")]
    AnalysisFailed(String),
}

impl PipelineError {
    /// Short, human-readable message for display next to the upload control.
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::InvalidFileType { .. } => "Please upload a valid CSV file",
            PipelineError::EmptyData => "The CSV file contains no data rows",
            PipelineError::Parse(_) => "Failed to parse CSV file. Please check the format.",
            PipelineError::AnalysisFailed(_) => {
                "Fraud analysis failed. Please ensure the backend is running and the CSV format is correct."
            }
        }
    }

    /// Stable label for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidFileType { .. } => "invalid_file_type",
            PipelineError::EmptyData => "empty_data",
            PipelineError::Parse(_) => "parse",
            PipelineError::AnalysisFailed(_) => "analysis_failed",
        }
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return PipelineError::AnalysisFailed(format!("request timed out: {}", err));
        }
        PipelineError::AnalysisFailed(err.to_string())
    }
}
