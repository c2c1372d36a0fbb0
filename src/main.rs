//! climate-extremes - lowest and highest climate readings
//!
//! Usage:
//!   climate-extremes [--config <yaml>] [--temperature <csv>] [--sea-level <csv>]
//!                    [--co2 <csv>] [--output <txt>] [--region <name>]
//!                    [--strict] [--format text|json]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use climate_extremes::climate::{ClimateConfig, ClimateConfigBuilder, Report, SeriesIndex, SeriesKind};

#[derive(Parser)]
#[command(name = "climate-extremes")]
#[command(about = "Report the lowest and highest climate readings with same-date context")]
struct Cli {
    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Temperature anomaly CSV
    #[arg(long)]
    temperature: Option<PathBuf>,

    /// Sea level CSV
    #[arg(long)]
    sea_level: Option<PathBuf>,

    /// CO2 concentration CSV
    #[arg(long)]
    co2: Option<PathBuf>,

    /// Report output file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Entity whose rows are ingested
    #[arg(long)]
    region: Option<String>,

    /// Abort on the first malformed row
    #[arg(long)]
    strict: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "climate_extremes=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    tracing::info!(
        region = %config.region,
        strict = config.strict,
        output = %config.output.display(),
        "Configuration loaded"
    );

    let mut indices = Vec::with_capacity(SeriesKind::ALL.len());
    for kind in SeriesKind::ALL {
        let path = config.path_for(kind);
        let (index, _) = SeriesIndex::from_path(kind, path, &config.region, config.strict)
            .with_context(|| format!("Failed to load {kind} series from {}", path.display()))?;
        indices.push(index);
    }

    let report = Report::build(&indices).context("Failed to compute extremes")?;
    let rendered = match cli.format {
        OutputFormat::Text => report.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(&report).context("Failed to serialize report")?,
    };

    println!("{rendered}");
    fs::write(&config.output, format!("{rendered}\n"))
        .with_context(|| format!("Failed to write report to {}", config.output.display()))?;

    tracing::info!(output = %config.output.display(), "Report written");
    Ok(())
}

/// Layers defaults, the YAML file, the environment and the flags.
fn load_config(cli: &Cli) -> Result<ClimateConfig> {
    let base = match &cli.config {
        Some(path) => ClimateConfig::from_yaml_file(path).context("Failed to load configuration file")?,
        None => ClimateConfig::default(),
    };
    let base = base
        .with_env_overrides()
        .context("Invalid CLIMATE_* environment override")?;

    let mut builder = ClimateConfigBuilder::from(base);
    if let Some(path) = &cli.temperature {
        builder = builder.temperature(path);
    }
    if let Some(path) = &cli.sea_level {
        builder = builder.sea_level(path);
    }
    if let Some(path) = &cli.co2 {
        builder = builder.co2(path);
    }
    if let Some(path) = &cli.output {
        builder = builder.output(path);
    }
    if let Some(region) = &cli.region {
        builder = builder.region(region);
    }
    if cli.strict {
        builder = builder.strict(true);
    }
    builder.build().context("Invalid configuration")
}
