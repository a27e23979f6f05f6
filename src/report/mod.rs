//! Report generation.
//!
//! Every exporter consumes only the analytics payload plus report metadata;
//! numbers are formatted by an explicit [`Formatter`].

pub mod document;
pub mod format;
pub mod markdown;
pub mod raw;
pub mod spreadsheet;

pub use format::{export_file_name, Formatter};

use crate::error::ExportError;
use crate::models::{AnalyticsPayload, ReportMetadata};
use std::fmt;
use std::str::FromStr;

/// Output format of the analytics export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Analytics payload as JSON (default)
    #[default]
    Json,
    /// Markdown document
    Markdown,
    /// Print-oriented HTML document
    Html,
    /// Workbook model as JSON
    Workbook,
    /// Data sheet as CSV
    Csv,
}

impl ReportFormat {
    /// File extension used for generated file names.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "md",
            ReportFormat::Html => "html",
            ReportFormat::Workbook => "workbook.json",
            ReportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "markdown",
            ReportFormat::Html => "html",
            ReportFormat::Workbook => "workbook",
            ReportFormat::Csv => "csv",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ReportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "html" => Ok(ReportFormat::Html),
            "workbook" | "xlsx" => Ok(ReportFormat::Workbook),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Generate a JSON report.
pub fn generate_json_report(payload: &AnalyticsPayload) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(payload)?)
}

/// Render the payload in the requested format.
pub fn render_report(
    format: ReportFormat,
    payload: &AnalyticsPayload,
    metadata: &ReportMetadata,
    formatter: &Formatter,
    app_name: &str,
) -> Result<String, ExportError> {
    match format {
        ReportFormat::Json => generate_json_report(payload),
        ReportFormat::Markdown => Ok(markdown::generate_markdown_report(
            payload, metadata, formatter, app_name,
        )),
        ReportFormat::Html => Ok(document::generate_html_report(
            payload, metadata, formatter, app_name,
        )),
        ReportFormat::Workbook => {
            let workbook = spreadsheet::build_workbook(payload, metadata, formatter);
            spreadsheet::workbook_json(&workbook)
        }
        ReportFormat::Csv => {
            let workbook = spreadsheet::build_workbook(payload, metadata, formatter);
            spreadsheet::data_sheet_csv(&workbook)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionSummary;

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!("xlsx".parse::<ReportFormat>().unwrap(), ReportFormat::Workbook);
        assert!(matches!(
            "pdf".parse::<ReportFormat>(),
            Err(ExportError::UnsupportedFormat(f)) if f == "pdf"
        ));
    }

    #[test]
    fn test_render_every_format() {
        let mut payload = AnalyticsPayload::default();
        let mut summary = QuestionSummary::empty("Kota");
        summary.counts.insert("Bandung".to_string(), 2);
        summary.total = 2;
        payload.analytics.insert("kota".to_string(), summary);

        let metadata = ReportMetadata::new("Survei");
        let formatter = Formatter::default();

        for format in [
            ReportFormat::Json,
            ReportFormat::Markdown,
            ReportFormat::Html,
            ReportFormat::Workbook,
            ReportFormat::Csv,
        ] {
            let output = render_report(format, &payload, &metadata, &formatter, "App").unwrap();
            assert!(output.contains("Bandung"), "{} output lacks label", format);
        }
    }

    #[test]
    fn test_json_report_shape() {
        let json = generate_json_report(&AnalyticsPayload::default()).unwrap();
        assert!(json.contains("\"analytics\""));
        assert!(json.contains("\"completionRate\""));
    }
}
