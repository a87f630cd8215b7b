use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dungen::{Algorithm, GeneratedMap, GeneratorConfig, generate_map};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Ascii,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a dungeon map", long_about = None)]
struct Args {
    /// bsp, cellular, voronoi or dla
    #[arg(short, long, default_value = "bsp", value_parser = parse_algorithm)]
    algorithm: Algorithm,
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Overrides the configured width
    #[arg(long)]
    width: Option<usize>,
    /// Overrides the configured height
    #[arg(long)]
    height: Option<usize>,
    /// TOML file with generator settings
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Ascii)]
    format: OutputFormat,
    /// Log generation steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    seed: u64,
    fingerprint: u64,
    #[serde(flatten)]
    generated: &'a GeneratedMap,
}

fn parse_algorithm(name: &str) -> Result<Algorithm, String> {
    name.parse().map_err(|error: dungen::MapgenError| error.to_string())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let filter =
        EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn load_config(
    path: Option<&Path>,
    width: Option<usize>,
    height: Option<usize>,
) -> Result<GeneratorConfig> {
    let mut config = match path {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            GeneratorConfig::from_toml_str(&source)
                .with_context(|| format!("Invalid config file: {}", path.display()))?
        }
        None => GeneratorConfig::default(),
    };
    if let Some(width) = width {
        config.width = width;
    }
    if let Some(height) = height {
        config.height = height;
    }
    config.validate().context("Invalid map dimensions")?;
    Ok(config)
}

fn render(generated: &GeneratedMap, seed: u64, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Ascii => Ok(generated.map.to_ascii()),
        OutputFormat::Json => {
            let report = Report { seed, fingerprint: generated.fingerprint(), generated };
            serde_json::to_string_pretty(&report).context("Failed to serialize map")
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref(), args.width, args.height)?;
    let generated = generate_map(args.algorithm, args.seed, &config)
        .with_context(|| format!("Failed to generate a {} map", args.algorithm))?;
    println!("{}", render(&generated, args.seed, args.format)?.trim_end());
    Ok(())
}
