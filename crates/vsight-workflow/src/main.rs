//! VeriSight command-line front end.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use vsight_models::{ForensicReport, SessionContext};
use vsight_workflow::{init_tracing, WorkflowConfig, WorkflowController};

#[derive(Parser)]
#[command(name = "vsight", version, about = "Forensic authenticity analysis for video files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a video file and print the forensic report
    Analyze {
        /// Video file to analyze
        file: PathBuf,
        /// Operator label stamped on the dossier
        #[arg(long)]
        operator: Option<String>,
        /// Bearer token forwarded to the analysis relay
        #[arg(long)]
        token: Option<String>,
        /// Write a PDF dossier into this directory
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print container metadata and the planned sample timestamps
    Probe {
        /// Video file to inspect
        file: PathBuf,
    },
    /// Print the JSON schema of the forensic report
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    let _ = rustls::crypto::ring::default_provider().install_default();

    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze {
            file,
            operator,
            token,
            export,
            json,
        } => analyze(file, operator, token, export, json).await,
        Command::Probe { file } => probe(file).await,
        Command::Schema => {
            let schema = schemars::schema_for!(ForensicReport);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

async fn analyze(
    file: PathBuf,
    operator: Option<String>,
    token: Option<String>,
    export: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = WorkflowConfig::from_env().context("Invalid configuration")?;

    let mut session = SessionContext::new(operator.unwrap_or_else(|| config.operator_id.clone()));
    if let Some(token) = token {
        session = session.with_token(token);
    }

    let controller = Arc::new(WorkflowController::from_config(&config, session)?);
    controller.select_file(&file);

    let mut progress = controller.subscribe();
    let watcher = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let update = progress.borrow_and_update().clone();
            if update.status.is_busy() {
                if let Some(message) = update.message {
                    info!(status = %update.status, "{}", message);
                }
            }
        }
    });

    let result = controller.start_analysis().await;
    watcher.abort();
    let report = result.map_err(|e| anyhow!(e.user_message()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(dir) = export {
        let path = controller
            .export_dossier_to(dir)
            .await
            .map_err(|e| anyhow!(e.user_message()))?;
        eprintln!("Dossier written to {}", path.display());
    }

    Ok(())
}

async fn probe(file: PathBuf) -> Result<()> {
    let config = WorkflowConfig::from_env().context("Invalid configuration")?;
    let info = vsight_media::probe_video(&file)
        .await
        .with_context(|| format!("Failed to probe {}", file.display()))?;

    let output = json!({
        "file": file.display().to_string(),
        "info": info,
        "resolution": info.resolution_label(),
        "sampleTimestamps": config.frames.timestamps(info.duration),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_report(report: &ForensicReport) {
    let meta = &report.metadata;
    println!("Verdict:    {}", report.verdict_label());
    println!(
        "Score:      {}/100 (confidence {})",
        report.score,
        report.confidence_level.as_str()
    );
    println!("Summary:    {}", report.summary);
    println!(
        "Coverage:   {} frames sampled, {} analyzed | audio {} | {} | {:.1}s",
        meta.frames_processed,
        meta.frames_processed.div_ceil(2),
        if meta.audio_processed { "yes" } else { "no" },
        meta.resolution_label,
        meta.duration_seconds
    );
    println!();
    println!("Detection vectors:");
    for finding in report.aligned_findings() {
        println!(
            "  [{}] {:<24} {:>3.0}%  {}",
            finding.status.as_str(),
            finding.category,
            finding.confidence,
            finding.detail
        );
    }
}
