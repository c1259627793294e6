use anyhow::{Context, Result};
use chrono::Utc;
use ledger_stats::{
    analyze_with_config, report::ReportOptions, AnalysisConfig, Address, ApiEnvelope, RawTransferRecord, Report,
};
use std::env;
use std::path::Path;
use tracing::{info, warn};

const USAGE: &str = "Usage: ledger_stats analyze <address> <normal.json> <internal.json> [output.json]\n       \
                     ledger_stats summary <address> <normal.json> <internal.json>";

//
// main
//

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("");

    match mode {
        "analyze" | "summary" => {
            let (Some(address), Some(normal_path), Some(internal_path)) = (args.get(2), args.get(3), args.get(4))
            else {
                eprintln!("{USAGE}");
                std::process::exit(1);
            };

            let output = match mode {
                "analyze" => Some(args.get(5).cloned().unwrap_or_else(|| "ledger_stats_report.json".to_string())),
                _ => None,
            };

            run_analysis(address, normal_path, internal_path, output.as_deref()).await?;
        }
        _ => {
            eprintln!("Unknown mode: '{mode}'.\n{USAGE}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();
}

async fn run_analysis(address: &str, normal_path: &str, internal_path: &str, output: Option<&str>) -> Result<()> {
    let address = Address::parse(address)?;
    let config = AnalysisConfig::from_env()?;

    // the two streams are independent, so load them side by side
    let (normal, internal) = tokio::join!(load_stream(normal_path), load_stream(internal_path));
    let (normal, internal) = (normal?, internal?);

    let history = analyze_with_config(&address, normal, internal, &config);
    let report = Report::build(&history, &ReportOptions::from(&config), Utc::now());

    for line in report.summary_lines() {
        println!("{line}");
    }

    if let Some(output) = output {
        let json_string = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(output, json_string).await.with_context(|| format!("writing report to {output}"))?;
        info!("report saved to {output}");
    }

    Ok(())
}

/// A missing file is an absent stream, not an error.
async fn load_stream(path: &str) -> Result<Option<Vec<RawTransferRecord>>> {
    if !Path::new(path).exists() {
        warn!("{path} not found, treating stream as absent");
        return Ok(None);
    }

    let content = tokio::fs::read_to_string(path).await.with_context(|| format!("reading {path}"))?;
    let records = ApiEnvelope::parse_records(&content).with_context(|| format!("parsing {path}"))?;

    match &records {
        Some(records) => info!("loaded {} records from {path}", records.len()),
        None => info!("{path} reports no transactions"),
    }

    Ok(records)
}
