//! Sample Transaction Generator
//!
//! Writes a synthetic `Time,V1..V28,Amount` CSV for exercising the pipeline
//! against a running scoring service.

use anyhow::Context;
use clap::Parser;
use rand::Rng;
use std::path::PathBuf;
use tracing::info;

/// Number of anonymised principal-component features
const FEATURE_COUNT: usize = 28;

#[derive(Parser)]
#[command(name = "sample-generator")]
#[command(about = "Generate a synthetic credit card transaction CSV", long_about = None)]
struct Args {
    /// Output file
    #[arg(long, default_value = "sample_transactions.csv")]
    out: PathBuf,
    /// Number of transactions
    #[arg(long, default_value_t = 100)]
    count: u64,
    /// Fraction of rows generated as outliers
    #[arg(long, default_value_t = 0.05)]
    outlier_rate: f64,
}

/// Transaction row generator
struct TransactionGenerator {
    rng: rand::rngs::ThreadRng,
    elapsed_secs: f64,
}

impl TransactionGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            elapsed_secs: 0.0,
        }
    }

    /// Typical purchase: small features, modest amount
    fn generate_legitimate(&mut self) -> Vec<f64> {
        self.advance_clock();
        let mut row = Vec::with_capacity(FEATURE_COUNT + 2);
        row.push(self.elapsed_secs);
        for _ in 0..FEATURE_COUNT {
            row.push(self.rng.gen_range(-2.0..2.0));
        }
        row.push(self.rng.gen_range(1.0..250.0));
        row
    }

    /// Outlier: extreme features, large amount
    fn generate_outlier(&mut self) -> Vec<f64> {
        self.advance_clock();
        let mut row = Vec::with_capacity(FEATURE_COUNT + 2);
        row.push(self.elapsed_secs);
        for _ in 0..FEATURE_COUNT {
            let magnitude = self.rng.gen_range(4.0..15.0);
            row.push(if self.rng.gen_bool(0.5) { magnitude } else { -magnitude });
        }
        row.push(self.rng.gen_range(1000.0..10000.0));
        row
    }

    fn advance_clock(&mut self) {
        self.elapsed_secs += self.rng.gen_range(0.0..120.0_f64).round();
    }
}

fn header() -> String {
    let mut columns = vec!["Time".to_string()];
    columns.extend((1..=FEATURE_COUNT).map(|i| format!("V{}", i)));
    columns.push("Amount".to_string());
    columns.join(",")
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_generator=info".parse()?),
        )
        .init();

    let args = Args::parse();
    info!(
        out = %args.out.display(),
        count = args.count,
        outlier_rate = args.outlier_rate,
        "Generating sample transactions"
    );

    let mut generator = TransactionGenerator::new();
    let mut rng = rand::thread_rng();
    let outlier_rate = args.outlier_rate.clamp(0.0, 1.0);

    let mut output = header();
    let mut outliers = 0u64;

    for _ in 0..args.count {
        let row = if rng.gen_bool(outlier_rate) {
            outliers += 1;
            generator.generate_outlier()
        } else {
            generator.generate_legitimate()
        };

        let cells: Vec<String> = row.iter().map(|v| format!("{:.6}", v)).collect();
        output.push('\n');
        output.push_str(&cells.join(","));
    }
    output.push('\n');

    std::fs::write(&args.out, output)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    info!(
        "Completed! Wrote {} transactions ({} legitimate, {} outliers)",
        args.count,
        args.count - outliers,
        outliers
    );

    Ok(())
}
