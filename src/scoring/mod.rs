//! Scoring service dispatch

pub mod client;
pub mod response;

pub use client::{ScoringClient, ScoringService, UploadFile};
pub use response::{HealthStatus, RawPrediction, RawPredictionResponse, ServiceSummary};
