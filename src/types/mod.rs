//! Type definitions for the fraud scoring pipeline

pub mod result;
pub mod row;

pub use result::{Prediction, RiskBand, RiskBandThresholds, TransactionResult};
pub use row::{CellValue, ColumnSet, RawRow};
