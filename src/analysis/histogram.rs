//! Fixed-range binning of hybrid risk scores

use crate::types::result::TransactionResult;
use serde::Serialize;

/// Number of buckets covering `[0, 100]`
pub const BIN_COUNT: usize = 5;

const BIN_WIDTH: f64 = 20.0;

const LABELS: [&str; BIN_COUNT] = ["0-20%", "20-40%", "40-60%", "60-80%", "80-100%"];

/// One histogram bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bin {
    pub range: &'static str,
    pub count: u64,
}

/// Ascending buckets `[0,20) [20,40) [40,60) [60,80) [80,100]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramBins(pub [Bin; BIN_COUNT]);

impl HistogramBins {
    pub fn empty() -> Self {
        Self(LABELS.map(|range| Bin { range, count: 0 }))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bin> {
        self.0.iter()
    }

    pub fn counts(&self) -> [u64; BIN_COUNT] {
        self.0.map(|b| b.count)
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|b| b.count).sum()
    }
}

/// Bucket index for a score. Boundaries belong to the upper bucket; 100 and
/// above land in the last one, negatives in the first.
pub fn bin_index(score: f64) -> usize {
    if score < BIN_WIDTH {
        0
    } else {
        ((score / BIN_WIDTH) as usize).min(BIN_COUNT - 1)
    }
}

/// Count results per risk-score bucket
pub fn bin(results: &[TransactionResult]) -> HistogramBins {
    let mut bins = HistogramBins::empty();
    for result in results {
        bins.0[bin_index(result.hybrid_risk_score)].count += 1;
    }
    bins
}
