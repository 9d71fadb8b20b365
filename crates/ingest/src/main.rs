//! Smart Hive Ingester - Main Entry Point
//!
//! Reads newline-delimited JSON device readings and prints one JSON
//! result per line.

use alerting::LogNotifier;
use anyhow::Context;
use clap::Parser;
use ingest::{init_logging, seed_hives, IngestConfig, Ingestor, Portal, SeedHive};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use storage::Requester;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "hive-ingest", version, about = "Evaluate hive sensor readings")]
struct Args {
    /// Configuration file (TOML, YAML, or JSON)
    #[arg(long, env = "HIVE_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of hives to register before ingesting
    #[arg(long)]
    hives: Option<PathBuf>,

    /// Readings file; stdin when omitted
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = IngestConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging);

    info!("=== Smart Hive Ingester v{} ===", env!("CARGO_PKG_VERSION"));

    let ingestor = Ingestor::from_config(&config, Arc::new(LogNotifier));
    let portal = Portal::from_config(&config, ingestor.repository().clone());
    portal.bootstrap_admin().context("Failed to create admin account")?;

    if let Some(path) = &args.hives {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read hives file {}", path.display()))?;
        let seeds: Vec<SeedHive> =
            serde_json::from_str(&raw).context("Failed to parse hives file")?;
        seed_hives(&ingestor, seeds).context("Failed to seed hives")?;
    }

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut lines = reader.lines();
    let mut line_no = 0usize;
    let (mut accepted, mut rejected, mut alerts) = (0usize, 0usize, 0usize);

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let output = match ingestor.ingest_json(&line) {
            Ok(outcome) => {
                accepted += 1;
                alerts += outcome.alerts.len();
                json!({ "line": line_no, "status": "success", "result": outcome })
            }
            Err(e) => {
                rejected += 1;
                json!({ "line": line_no, "status": "error", "message": e.to_string() })
            }
        };
        println!("{}", output);
    }

    let stats = ingestor.repository().dashboard_stats(&Requester::admin(0))?;
    info!(
        accepted,
        rejected,
        alerts,
        hives = stats.total_hives,
        unread_alerts = stats.active_alerts,
        temperature_avg = stats.temperature_avg,
        humidity_avg = stats.humidity_avg,
        "Ingestion finished"
    );

    Ok(())
}
