//! Survey Analytics - answer aggregation and report export for surveys
//!
//! A CLI tool that aggregates survey responses per question, resolves raw
//! answer values into human-readable labels and exports the results.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, unreadable input, write failure, etc.)

mod analysis;
mod answers;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod presenter;
mod report;
mod schema;

use analysis::{build_analytics_payload, AggregationOptions};
use anyhow::{Context, Result};
use cli::{
    AnalyzeArgs, Args, Command, ExportResponsesArgs, RawFormat, ResponsesArgs, ResponsesFormat,
};
use config::{Config, CONFIG_FILE_NAME};
use models::{AnalyticsPayload, ReportMetadata};
use presenter::ResponsePresenter;
use report::{export_file_name, Formatter, ReportFormat};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    let (config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("survey-analytics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_source {
        Some(path) => info!("Loaded config from: {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    if let Err(e) = run(&args, &config) {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .survey-analytics.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize locale, labels, number formatting, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn run(args: &Args, config: &Config) -> Result<()> {
    match &args.command {
        Command::Analyze(analyze) => handle_analyze(analyze, config, args.quiet),
        Command::Responses(responses) => handle_responses(responses, config),
        Command::ExportResponses(export) => handle_export_responses(export),
        Command::InitConfig => handle_init_config(),
    }
}

/// Build the analytics payload and write the requested export.
fn handle_analyze(args: &AnalyzeArgs, config: &Config, quiet: bool) -> Result<()> {
    let document = loader::load_survey(&args.survey)
        .with_context(|| format!("Failed to load survey: {}", args.survey.display()))?;

    let responses = match (&args.responses, &args.responses_dir) {
        (Some(path), _) => loader::load_responses(path)
            .with_context(|| format!("Failed to load responses: {}", path.display()))?,
        (None, Some(dir)) => loader::load_responses_dir(dir, !quiet)
            .with_context(|| format!("Failed to load responses from: {}", dir.display()))?,
        (None, None) => anyhow::bail!("Either --responses or --responses-dir is required"),
    };

    let options = AggregationOptions::from(&config.analytics);
    let payload = build_analytics_payload(&document.schema, &responses, &options);

    let format = match args.format {
        Some(format) => format,
        None => config
            .general
            .default_format
            .parse::<ReportFormat>()
            .context("Invalid general.default_format in config")?,
    };

    let title = document.display_title(&config.analytics.locale);
    let metadata = ReportMetadata::new(title.clone());
    let formatter = Formatter::from(&config.format);

    let content = report::render_report(
        format,
        &payload,
        &metadata,
        &formatter,
        &config.export.app_name,
    )
    .with_context(|| format!("Failed to render {} report", format))?;

    let default_name = export_file_name(
        &config.export.file_prefix,
        document.slug.as_deref().unwrap_or(title.as_str()),
        format.extension(),
        &formatter,
        &metadata.generated_at,
    );
    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_name));

    let written = write_output(&destination, &content)?;
    if let Some(path) = written {
        print_summary(&payload, &path);
    }

    Ok(())
}

/// Present responses with human-readable labels.
fn handle_responses(args: &ResponsesArgs, config: &Config) -> Result<()> {
    let document = loader::load_survey(&args.survey)
        .with_context(|| format!("Failed to load survey: {}", args.survey.display()))?;
    let responses = loader::load_responses(&args.responses)
        .with_context(|| format!("Failed to load responses: {}", args.responses.display()))?;

    let booleans = AggregationOptions::from(&config.analytics).booleans;
    let response_presenter = ResponsePresenter::new(&document.schema, &config.analytics.locale, booleans);

    let ordered = presenter::latest_first(&responses);
    let limit = args.limit.unwrap_or(ordered.len());
    let presented: Vec<_> = ordered
        .into_iter()
        .take(limit)
        .map(|response| response_presenter.present(response))
        .collect();

    if presented.len() < responses.len() {
        info!("Showing {} of {} responses", presented.len(), responses.len());
    }

    let content = match args.format {
        ResponsesFormat::Json => serde_json::to_string_pretty(&presented)
            .context("Failed to serialize responses")?,
        ResponsesFormat::Markdown => {
            presenter::render_markdown(&presented, &Formatter::from(&config.format))
        }
    };

    let destination = args.output.clone().unwrap_or_else(|| PathBuf::from("-"));
    if let Some(path) = write_output(&destination, &content)? {
        println!("✅ Responses saved to: {}", path.display());
    }
    Ok(())
}

/// Write the raw responses as CSV or JSON.
fn handle_export_responses(args: &ExportResponsesArgs) -> Result<()> {
    let responses = loader::load_responses(&args.responses)
        .with_context(|| format!("Failed to load responses: {}", args.responses.display()))?;

    if responses.is_empty() {
        warn!("No responses to export");
    }

    let content = match args.format {
        RawFormat::Csv => {
            report::raw::responses_csv(&responses).context("Failed to build responses CSV")?
        }
        RawFormat::Json => {
            report::raw::responses_json(&responses).context("Failed to build responses JSON")?
        }
    };

    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| args.format.default_output());
    if let Some(path) = write_output(&destination, &content)? {
        println!(
            "✅ Exported {} responses to: {}",
            responses.len(),
            path.display()
        );
    }
    Ok(())
}

/// Write `content` to `path`, or to stdout when `path` is `-`.
///
/// Returns the written file path, `None` for stdout.
fn write_output(path: &Path, content: &str) -> Result<Option<PathBuf>> {
    if path.as_os_str() == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        stdout.flush().context("Failed to flush stdout")?;
        return Ok(None);
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output to {}", path.display()))?;
    info!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(Some(path.to_path_buf()))
}

fn print_summary(payload: &AnalyticsPayload, path: &Path) {
    let stats = &payload.stats;
    let with_data = payload
        .analytics
        .values()
        .filter(|summary| summary.has_data())
        .count();

    println!("\n📊 Ringkasan Analitik:");
    println!("   Total respon: {}", stats.total_responses);
    println!(
        "   Total pertanyaan: {} ({} dengan jawaban)",
        stats.total_questions, with_data
    );
    println!("   Jawaban terekam: {}", stats.total_answered);
    println!("   Completion rate: {}%", stats.completion_rate);
    println!("\n✅ Report saved to: {}", path.display());
}

/// Load configuration from file or use defaults.
///
/// Returns the configuration and the file it came from, if any.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    let (mut config, source) = if let Some(ref config_path) = args.config {
        (Config::load(config_path)?, Some(config_path.clone()))
    } else {
        // Try default location
        match Config::load_default()? {
            Some(config) => (config, Some(PathBuf::from(CONFIG_FILE_NAME))),
            None => (Config::default(), None),
        }
    };

    config.merge_with_args(args);
    Ok((config, source))
}
