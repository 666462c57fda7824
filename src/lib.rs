//! FraudShield Client Pipeline
//!
//! Ingests a transaction CSV, submits it to an external hybrid fraud scoring
//! service, and derives summaries, a risk histogram, result pages and a
//! re-exportable CSV from the returned predictions.

pub mod analysis;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod scoring;
pub mod session;
pub mod types;

pub use analysis::{AnalysisResults, HistogramBins, SummaryStatistics};
pub use config::AppConfig;
pub use error::{PipelineError, PipelineResult};
pub use ingest::{ParsedTable, TableIngestor};
pub use metrics::PipelineMetrics;
pub use pipeline::Pipeline;
pub use scoring::{ScoringClient, ScoringService, UploadFile};
pub use session::{Session, SessionState};
pub use types::{CellValue, Prediction, TransactionResult};
