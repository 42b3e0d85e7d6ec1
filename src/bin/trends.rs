//! Trends CLI - Command-line interface for Sleep Trends
//!
//! Commands:
//! - report: Compute the full trend report for a sleep log
//! - recommend: Print only the prioritized recommendations
//! - validate: Check every entry's ratings against their ranges
//! - config: Print the default analytics configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use sleep_trends::pipeline::{report_to_json, TrendReport};
use sleep_trends::{AnalyticsConfig, AnalyticsError, SleepLog, TrendAnalyzer, ENGINE_VERSION};

/// Trends - Sleep log analytics
#[derive(Parser)]
#[command(name = "trends")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Analyse a sleep log into trends and recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full trend report
    Report {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Analytics configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print only the prioritized recommendations
    Recommend {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Analytics configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate entry ratings
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration as JSON
    Config,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of entries
    Json,
    /// Newline-delimited JSON (one entry per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Human-readable summary
    Text,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "sleep_trends=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), TrendsCliError> {
    match cli.command {
        Commands::Report {
            input,
            input_format,
            output_format,
            config,
        } => cmd_report(&input, input_format, output_format, config.as_deref()),

        Commands::Recommend {
            input,
            input_format,
            config,
        } => cmd_recommend(&input, input_format, config.as_deref()),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Config => {
            println!("{}", AnalyticsConfig::default().to_json()?);
            Ok(())
        }
    }
}

fn cmd_report(
    input: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
) -> Result<(), TrendsCliError> {
    let analyzer = load_analyzer(config)?;
    let log = read_log(input, &input_format)?;
    let report = analyzer.compute_report(log.entries())?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
        OutputFormat::JsonPretty => println!("{}", report_to_json(&report)?),
        OutputFormat::Text => print_text_report(&report),
    }

    Ok(())
}

fn cmd_recommend(
    input: &Path,
    input_format: InputFormat,
    config: Option<&Path>,
) -> Result<(), TrendsCliError> {
    let analyzer = load_analyzer(config)?;
    let log = read_log(input, &input_format)?;

    for rec in analyzer.recommendations(log.entries())? {
        println!(
            "[{}] {}: {}",
            rec.priority.as_str(),
            rec.category.display_name(),
            rec.text
        );
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), TrendsCliError> {
    let log = read_log(input, &input_format)?;
    let failures = log.validate();

    let report = ValidationReport {
        total_entries: log.len(),
        valid_entries: log.len() - failures.len(),
        invalid_entries: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                index: f.index,
                entry_id: f.entry_id.clone(),
                error: f.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total entries:   {}", report.total_entries);
        println!("Valid entries:   {}", report.valid_entries);
        println!("Invalid entries: {}", report.invalid_entries);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Entry {} (index {}): {}", err.entry_id, err.index, err.error);
            }
        }
    }

    if report.invalid_entries > 0 {
        Err(TrendsCliError::ValidationFailed(report.invalid_entries))
    } else {
        Ok(())
    }
}

// Helper functions

fn load_analyzer(config: Option<&Path>) -> Result<TrendAnalyzer, TrendsCliError> {
    let config = match config {
        Some(path) => AnalyticsConfig::from_json(&fs::read_to_string(path)?)?,
        None => AnalyticsConfig::default(),
    };
    Ok(TrendAnalyzer::new(config)?)
}

fn read_log(input: &Path, format: &InputFormat) -> Result<SleepLog, TrendsCliError> {
    let data = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(TrendsCliError::NoInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let log = match format {
        InputFormat::Json => SleepLog::from_json(&data)?,
        InputFormat::Ndjson => SleepLog::parse_ndjson(&data)?,
    };
    tracing::info!(entries = log.len(), "loaded sleep log");
    Ok(log)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

fn print_text_report(report: &TrendReport) {
    let summary = &report.summary;

    println!("Sleep Trend Report");
    println!("==================");
    println!("Entries:            {}", report.entry_count);
    println!("Average duration:   {} h", fmt_opt(summary.avg_duration_hours));
    println!("Average quality:    {}", fmt_opt(summary.avg_quality));
    println!("Sleep debt:         {:.2} h", summary.total_sleep_debt_hours);
    println!(
        "Bedtime variability: {:.0} min ({})",
        report.bedtime_consistency.variability_minutes,
        report.bedtime_consistency.band.label()
    );
    println!(
        "Wake variability:    {:.0} min ({})",
        report.wake_consistency.variability_minutes,
        report.wake_consistency.band.label()
    );

    println!("\nBy weekday:");
    for day in &report.weekdays.days {
        println!(
            "  {:<9} n={} duration={} quality={}",
            day.day.as_str(),
            day.count,
            fmt_opt(day.avg_duration_hours),
            fmt_opt(day.avg_quality)
        );
    }

    println!("\nCorrelations with sleep quality:");
    for (name, result) in [
        ("duration", &report.correlations.quality_vs_duration),
        ("mood", &report.correlations.quality_vs_mood),
        ("energy", &report.correlations.quality_vs_energy),
    ] {
        println!(
            "  {:<9} r={:+.2} ({}, {:?})",
            name,
            result.coefficient,
            result.strength.label(),
            result.direction
        );
    }

    println!("\nRecommendations:");
    for rec in &report.recommendations {
        println!(
            "  [{}] {}: {}",
            rec.priority.as_str(),
            rec.category.display_name(),
            rec.text
        );
    }
}

// Error types

#[derive(Debug)]
enum TrendsCliError {
    Io(io::Error),
    Analytics(AnalyticsError),
    Json(serde_json::Error),
    NoInput,
    ValidationFailed(usize),
}

impl From<io::Error> for TrendsCliError {
    fn from(e: io::Error) -> Self {
        TrendsCliError::Io(e)
    }
}

impl From<AnalyticsError> for TrendsCliError {
    fn from(e: AnalyticsError) -> Self {
        TrendsCliError::Analytics(e)
    }
}

impl From<serde_json::Error> for TrendsCliError {
    fn from(e: serde_json::Error) -> Self {
        TrendsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TrendsCliError> for CliError {
    fn from(e: TrendsCliError) -> Self {
        match e {
            TrendsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            TrendsCliError::Analytics(e @ AnalyticsError::RatingOutOfRange { .. }) => CliError {
                code: "RATING_OUT_OF_RANGE".to_string(),
                message: e.to_string(),
                hint: Some("Run 'trends validate' or set rating_policy to clamp".to_string()),
            },
            TrendsCliError::Analytics(e @ AnalyticsError::InvalidConfig(_)) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: e.to_string(),
                hint: Some("Run 'trends config' to see a valid configuration".to_string()),
            },
            TrendsCliError::Analytics(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Entries need date, bedTime, wakeTime (HH:MM), sleepQuality, mood and energy".to_string()),
            },
            TrendsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            TrendsCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a terminal, nothing to read".to_string(),
                hint: Some("Pipe a sleep log into the command or pass a file with -i".to_string()),
            },
            TrendsCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} entries failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_entries: usize,
    valid_entries: usize,
    invalid_entries: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    entry_id: String,
    error: String,
}
