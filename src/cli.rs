//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::report::ReportFormat;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Survey Analytics - answer aggregation and report export for surveys
///
/// Aggregates survey responses per question, resolves raw answer values to
/// human-readable labels and exports the results as JSON, Markdown, HTML,
/// a spreadsheet workbook model or CSV.
///
/// Examples:
///   survey-analytics analyze --survey survey.json --responses responses.json
///   survey-analytics analyze --survey survey.json --responses-dir ./responses --format html
///   survey-analytics responses --survey survey.json --responses responses.json --limit 20
///   survey-analytics export-responses --responses responses.json --output -
///   survey-analytics export-responses --responses responses.json --format json
///   survey-analytics init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .survey-analytics.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Locale for localized titles and option texts (e.g. id, en)
    #[arg(long, value_name = "LOCALE", env = "SURVEY_ANALYTICS_LOCALE", global = true)]
    pub locale: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Aggregate responses and export the analytics report
    Analyze(AnalyzeArgs),

    /// Show responses with human-readable answer labels
    Responses(ResponsesArgs),

    /// Export raw responses as CSV or JSON
    ExportResponses(ExportResponsesArgs),

    /// Generate a default .survey-analytics.toml configuration file
    InitConfig,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Survey schema file (bare schema or survey record with schema_json)
    #[arg(short, long, value_name = "FILE")]
    pub survey: PathBuf,

    /// Responses file (JSON array or object with a `responses` array)
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present = "responses_dir",
        conflicts_with = "responses_dir"
    )]
    pub responses: Option<PathBuf>,

    /// Directory of response files, one JSON response per file
    #[arg(long, value_name = "DIR")]
    pub responses_dir: Option<PathBuf>,

    /// Output format; defaults to `general.default_format` from the config
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Output file path, `-` for stdout
    ///
    /// Defaults to analitik-{survey}-{timestamp}.{ext}
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ResponsesArgs {
    /// Survey schema file
    #[arg(short, long, value_name = "FILE")]
    pub survey: PathBuf,

    /// Responses file
    #[arg(short, long, value_name = "FILE")]
    pub responses: PathBuf,

    /// Output format (markdown, json)
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    pub format: ResponsesFormat,

    /// Show at most this many responses, newest first
    #[arg(long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Output file path (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExportResponsesArgs {
    /// Responses file
    #[arg(short, long, value_name = "FILE")]
    pub responses: PathBuf,

    /// Output format (csv, json)
    #[arg(short, long, default_value = "csv", value_name = "FORMAT")]
    pub format: RawFormat,

    /// Output file path, `-` for stdout
    ///
    /// Defaults to responses.csv or responses.json
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Output format for raw responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RawFormat {
    /// CSV, oldest first (default)
    #[default]
    Csv,
    /// JSON array, newest first
    Json,
}

impl RawFormat {
    /// Default output file for this format.
    pub fn default_output(&self) -> PathBuf {
        match self {
            RawFormat::Csv => PathBuf::from("responses.csv"),
            RawFormat::Json => PathBuf::from("responses.json"),
        }
    }
}

/// Output format for presented responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ResponsesFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref locale) = self.locale {
            if locale.trim().is_empty() {
                return Err("Locale must not be empty".to_string());
            }
        }

        match &self.command {
            Command::Analyze(analyze) => {
                require_file(&analyze.survey, "Survey file")?;
                if let Some(ref responses) = analyze.responses {
                    require_file(responses, "Responses file")?;
                }
                if let Some(ref dir) = analyze.responses_dir {
                    if !dir.is_dir() {
                        return Err(format!(
                            "Responses directory does not exist: {}",
                            dir.display()
                        ));
                    }
                }
            }
            Command::Responses(responses) => {
                require_file(&responses.survey, "Survey file")?;
                require_file(&responses.responses, "Responses file")?;
                if responses.limit == Some(0) {
                    return Err("Limit must be at least 1".to_string());
                }
            }
            Command::ExportResponses(export) => {
                require_file(&export.responses, "Responses file")?;
            }
            Command::InitConfig => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

fn require_file(path: &Path, what: &str) -> Result<(), String> {
    if path.is_file() {
        Ok(())
    } else {
        Err(format!("{} does not exist: {}", what, path.display()))
    }
}
