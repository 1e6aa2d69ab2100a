//! Multire CLI
//!
//! Command-line interface for classifying strings against a pattern set.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use multire_engine::{
    Classifier, CompiledEngine, EngineConfig, EngineError, EngineStats, QueryMode,
};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "multire")]
#[command(about = "Multire - classify strings against many regular expressions at once", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify inputs (arguments, or stdin lines when none are given)
    Match {
        /// Patterns file: JSON object of pattern -> value
        #[arg(short, long)]
        patterns: PathBuf,

        /// Query mode: longest, eager or all
        #[arg(short, long, default_value = "longest")]
        mode: QueryMode,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Log level
        #[arg(short, long, default_value = "warn")]
        log_level: String,

        /// Strings to classify
        inputs: Vec<String>,
    },

    /// Compile the pattern set and report errors
    Validate {
        /// Patterns file: JSON object of pattern -> value
        #[arg(short, long)]
        patterns: PathBuf,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print automaton statistics as JSON
    Stats {
        /// Patterns file: JSON object of pattern -> value
        #[arg(short, long)]
        patterns: PathBuf,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct StatsReport<'a> {
    patterns_file: &'a Path,
    config: &'a EngineConfig,
    #[serde(flatten)]
    stats: EngineStats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Match {
            patterns,
            mode,
            config,
            log_level,
            inputs,
        } => {
            setup_logging(&log_level)?;
            run_match(&patterns, config.as_deref(), mode, inputs)?;
        }
        Commands::Validate { patterns, config } => {
            setup_logging("info")?;
            validate_patterns(&patterns, config.as_deref())?;
        }
        Commands::Stats { patterns, config } => {
            setup_logging("warn")?;
            print_stats(&patterns, config.as_deref())?;
        }
    }

    Ok(())
}

fn setup_logging(level: &str) -> Result<()> {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);

    // stdout carries match output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn load_patterns(path: &Path) -> Result<serde_json::Map<String, Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read patterns {}", path.display()))?;
    parse_patterns(&text).with_context(|| format!("Invalid patterns file {}", path.display()))
}

fn parse_patterns(text: &str) -> Result<serde_json::Map<String, Value>> {
    match serde_json::from_str(text)? {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("expected a JSON object mapping pattern to value"),
    }
}

/// Register every pattern and compile. An empty pattern set yields an
/// engine that never matches.
fn build_engine(patterns: &Path, config: EngineConfig) -> Result<Arc<CompiledEngine<Value>>> {
    let entries = load_patterns(patterns)?;
    info!(patterns = entries.len(), file = %patterns.display(), "Loading patterns");

    let classifier = Classifier::with_config(config);
    for (pattern, value) in entries {
        debug!(pattern = %pattern, "Registering pattern");
        classifier.register(pattern, value)?;
    }

    match classifier.compile() {
        Ok(engine) => Ok(engine),
        Err(EngineError::EmptyRegistry) => {
            warn!(file = %patterns.display(), "Pattern file is empty");
            Ok(classifier.engine()?)
        }
        Err(err) => Err(err).context("Failed to compile patterns"),
    }
}

fn run_match(
    patterns: &Path,
    config: Option<&Path>,
    mode: QueryMode,
    inputs: Vec<String>,
) -> Result<()> {
    let engine = build_engine(patterns, load_config(config)?)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if inputs.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("Failed to read stdin")?;
            writeln!(out, "{}", format_match(&engine, mode, &line)?)?;
        }
    } else {
        for input in &inputs {
            writeln!(out, "{}", format_match(&engine, mode, input)?)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// `input<TAB>value`; `-` when nothing matches, a JSON array in `all` mode
fn format_match(engine: &CompiledEngine<Value>, mode: QueryMode, input: &str) -> Result<String> {
    let values = engine.query(mode, input);
    let rendered = match (mode, values.as_slice()) {
        (_, []) => "-".to_string(),
        (QueryMode::All, values) => serde_json::to_string(values)?,
        (_, [value, ..]) => serde_json::to_string(value)?,
    };
    Ok(format!("{input}\t{rendered}"))
}

fn validate_patterns(patterns: &Path, config: Option<&Path>) -> Result<()> {
    info!("Validating patterns in {}", patterns.display());

    let engine = build_engine(patterns, load_config(config)?)?;
    let stats = engine.stats();

    info!(
        patterns = stats.pattern_count,
        states = stats.state_count,
        "Validation complete"
    );

    Ok(())
}

fn print_stats(patterns: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let engine = build_engine(patterns, config.clone())?;

    let report = StatsReport {
        patterns_file: patterns,
        config: &config,
        stats: engine.stats(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
