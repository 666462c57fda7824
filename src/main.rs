//! FraudShield Pipeline - Command Line Driver
//!
//! Previews a transaction CSV, sends it to the scoring service, and logs the
//! summary cards, risk histogram and a page of results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fraudshield_pipeline::{
    analysis::exporter,
    config::{AppConfig, LogFormat},
    ingest::ParsedTable,
    metrics::{log_histogram, log_summary_cards},
    Pipeline, ScoringClient, TableIngestor,
};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fraudshield")]
#[command(about = "Hybrid fraud scoring client for transaction CSV files", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = fraudshield_pipeline::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and show the first rows
    Preview { file: PathBuf },
    /// Score a file and show the results
    Analyze {
        file: PathBuf,
        /// Results page to display
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Write the results CSV here (defaults to the configured file name)
        #[arg(long)]
        export: Option<PathBuf>,
        /// Skip writing the results CSV
        #[arg(long)]
        no_export: bool,
    },
    /// Check that the scoring service is reachable
    Health,
}

fn init_logging(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("fraudshield_pipeline={}", config.logging.level))
    });

    match config.logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn log_preview(table: &ParsedTable, config: &AppConfig) {
    let preview = table.preview(config.ingest.preview_rows, config.ingest.preview_columns);
    info!(
        "Data Preview - showing first {} of {} rows",
        preview.rows.len(),
        preview.total_rows
    );

    let mut header = preview.columns.join(" | ");
    if preview.hidden_columns > 0 {
        header.push_str(&format!(" | +{} more", preview.hidden_columns));
    }
    info!("  {}", header);
    for row in &preview.rows {
        let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        info!("  {}", cells.join(" | "));
    }
}

fn build_pipeline(scorer: ScoringClient, config: &AppConfig) -> Pipeline<ScoringClient> {
    Pipeline::new(scorer, TableIngestor::new(&config.ingest.extension))
        .with_required_columns(config.ingest.required_columns.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from_path(&cli.config)?;
    init_logging(&config);

    info!("Starting FraudShield pipeline");

    let scorer = ScoringClient::new(&config.scoring)?;

    match cli.command {
        Commands::Health => {
            let health = scorer.health_check().await?;
            info!(
                endpoint = %config.scoring.health_endpoint,
                status = %health.status,
                "Scoring service is up"
            );
        }
        Commands::Preview { file } => {
            let mut pipeline = build_pipeline(scorer, &config);
            let table = pipeline.select_path(&file).await.map_err(|e| {
                error!(error = %e, "{}", e.user_message());
                e
            })?;
            log_preview(table, &config);
        }
        Commands::Analyze {
            file,
            page,
            export,
            no_export,
        } => {
            let mut pipeline = build_pipeline(scorer, &config);
            let metrics = pipeline.metrics();

            let table = pipeline.select_path(&file).await.map_err(|e| {
                error!(error = %e, "{}", e.user_message());
                e
            })?;
            log_preview(table, &config);

            let analysis = match pipeline.analyze().await {
                Ok(analysis) => analysis,
                Err(e) => {
                    error!(error = %e, "{}", e.user_message());
                    metrics.print_summary();
                    return Err(e.into());
                }
            };

            log_summary_cards(&analysis.summary);
            let distribution = analysis.distribution();
            info!(
                fraud = distribution.fraud,
                non_fraud = distribution.non_fraud,
                "Fraud distribution"
            );
            log_histogram(&analysis.histogram());

            let view = analysis.view(page);
            info!(
                "Analysis Results - showing {}-{} of {} (page {}/{})",
                view.first_row, view.last_row, view.total_rows, view.number, view.total_pages
            );
            for r in view.items {
                info!(
                    "  #{:<6} ${:>10}  prob={:>5.1}%  anomaly={:>5.1}%  hybrid={:>5.1}% [{:?}]  {}",
                    r.id,
                    r.amount
                        .map(|a| format!("{:.2}", a))
                        .unwrap_or_else(|| "-".to_string()),
                    r.fraud_probability,
                    r.anomaly_score,
                    r.hybrid_risk_score,
                    r.risk_band(),
                    r.prediction
                );
            }

            if !no_export {
                let path = export.unwrap_or_else(|| PathBuf::from(&config.export.file_name));
                exporter::write_to(&analysis.results, &path).with_context(|| {
                    format!("Failed to export results for {}", analysis.file_name)
                })?;
            }

            metrics.print_summary();
        }
    }

    Ok(())
}
