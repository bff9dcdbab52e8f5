//! Kaon/pion yield analysis CLI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use kpr_analysis::{AnalysisArtifact, AnalysisConfig, Pipeline};
use kpr_record::RecordFile;

#[derive(Parser)]
#[command(name = "kpr")]
#[command(about = "Kaon/pion yields vs multiplicity tag with PID-matrix correction")]
#[command(version)]
struct Cli {
    /// Input record container (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Output artifact path (pretty JSON). Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Record set to read from the container
    #[arg(long, default_value = "events")]
    record_set: String,

    /// Maximum multiplicity tag; larger tags fold into the last bin
    #[arg(long, default_value = "60")]
    max_tag: usize,

    /// Maximum events to process (unlimited when absent)
    #[arg(long)]
    max_events: Option<u64>,

    /// Reference center-of-mass energy
    #[arg(long, default_value = "91.2")]
    ecm_ref: f64,

    /// Minimum charged multiplicity
    #[arg(long, default_value = "7")]
    min_nch: i64,

    /// Minimum thrust polar angle (degrees)
    #[arg(long, default_value = "30.0")]
    min_theta_deg: f64,

    /// Maximum thrust polar angle (degrees)
    #[arg(long, default_value = "150.0")]
    max_theta_deg: f64,

    /// Count kaons/pions at generator level (true/false/1/0/yes/no)
    #[arg(
        long,
        default_value = "false",
        value_parser = parse_bool_word,
        action = clap::ArgAction::Set
    )]
    gen_level: bool,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

fn parse_bool_word(raw: &str) -> std::result::Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(format!("expected true/false/1/0/yes/no, got '{other}'")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    let file = RecordFile::open(&cli.input)
        .with_context(|| format!("opening {}", cli.input.display()))?;
    let mut reader = file.record_set(&cli.record_set).with_context(|| {
        format!(
            "attaching to record set '{}' in {}",
            cli.record_set,
            cli.input.display()
        )
    })?;

    let config = AnalysisConfig {
        max_tag: cli.max_tag,
        max_events: cli.max_events,
        ecm_ref: cli.ecm_ref,
        min_nch: cli.min_nch,
        min_theta_deg: cli.min_theta_deg,
        max_theta_deg: cli.max_theta_deg,
        gen_level: cli.gen_level,
    };

    let mut pipeline = Pipeline::new(config);
    pipeline
        .run(&mut reader)
        .with_context(|| format!("streaming {}", cli.input.display()))?;
    let results = pipeline.finalize();

    if results.corrected.is_none() && !cli.gen_level {
        tracing::warn!("corrected series omitted (degenerate calibration)");
    }

    let artifact = AnalysisArtifact::from_results(&results);
    write_json(cli.output.as_ref(), serde_json::to_value(&artifact)?)
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(&value)?;
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "results written");
        }
        None => println!("{text}"),
    }
    Ok(())
}
