//! Re-export of normalized results as delimited text

use crate::types::result::TransactionResult;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Header row of the exported file
pub const EXPORT_HEADERS: [&str; 6] = [
    "ID",
    "Amount",
    "Fraud Probability (%)",
    "Anomaly Score (%)",
    "Hybrid Risk Score (%)",
    "Prediction",
];

/// Render results as comma-joined lines. No quoting is applied.
pub fn export(results: &[TransactionResult]) -> String {
    let mut output = EXPORT_HEADERS.join(",");

    for r in results {
        let amount = r.amount.map(fixed2).unwrap_or_default();
        output.push_str(&format!(
            "\n{},{},{},{},{},{}",
            r.id,
            amount,
            fixed2(r.fraud_probability),
            fixed2(r.anomaly_score),
            fixed2(r.hybrid_risk_score),
            r.prediction.label()
        ));
    }

    output
}

/// Export results and write them to `path`
pub fn write_to(results: &[TransactionResult], path: &Path) -> Result<()> {
    let text = export(results);
    std::fs::write(path, text.as_bytes())
        .with_context(|| format!("Failed to write export to {}", path.display()))?;

    info!(path = %path.display(), rows = results.len(), "Results exported");
    Ok(())
}

/// Two decimals, halves rounded away from zero
fn fixed2(value: f64) -> String {
    format!("{:.2}", (value * 100.0).round() / 100.0)
}
