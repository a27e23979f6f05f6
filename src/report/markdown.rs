//! Markdown report generation.
//!
//! This module renders the analytics payload as a Markdown document with the
//! same numbers as the HTML report.

use super::format::{slugify, Formatter};
use crate::analysis::most_answered_questions;
use crate::models::{AnalyticsPayload, DisplayMode, QuestionSummary, ReportMetadata, SurveyStats};

/// Generate a complete Markdown report.
pub fn generate_markdown_report(
    payload: &AnalyticsPayload,
    metadata: &ReportMetadata,
    formatter: &Formatter,
    app_name: &str,
) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# Analitik – {}\n\n", escape_inline(&metadata.survey_title)));

    output.push_str(&generate_metadata_section(metadata, formatter));
    output.push_str(&generate_table_of_contents(payload));
    output.push_str(&generate_summary_section(&payload.stats, payload));
    output.push_str(&generate_questions_section(payload, formatter));
    output.push_str(&generate_footer(app_name));

    output
}

fn generate_metadata_section(metadata: &ReportMetadata, formatter: &Formatter) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Survei:** {}\n", escape_inline(&metadata.survey_title)));
    section.push_str(&format!(
        "- **Dibuat pada:** {}\n",
        formatter.timestamp(&metadata.generated_at)
    ));
    section.push('\n');

    section
}

fn generate_table_of_contents(payload: &AnalyticsPayload) -> String {
    let mut toc = String::new();

    toc.push_str("## Daftar Isi\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Ringkasan](#ringkasan)\n");
    toc.push_str("- [Pertanyaan](#pertanyaan)\n");

    for (name, summary) in &payload.analytics {
        toc.push_str(&format!("  - [{}](#{})\n", escape_inline(&summary.title), anchor(name)));
    }

    toc.push('\n');
    toc
}

fn generate_summary_section(stats: &SurveyStats, payload: &AnalyticsPayload) -> String {
    let mut section = String::new();

    section.push_str("## Ringkasan\n\n");
    section.push_str("| Total Respon | Total Pertanyaan | Jawaban Terekam | Completion Rate |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | **{}%** |\n\n",
        stats.total_responses, stats.total_questions, stats.total_answered, stats.completion_rate
    ));

    let top = most_answered_questions(payload, 5);
    if !top.is_empty() {
        section.push_str("### Pertanyaan dengan Jawaban Terbanyak\n\n");
        section.push_str("| Pertanyaan | Jawaban |\n");
        section.push_str("|:---|:---:|\n");
        for (_, summary) in top {
            section.push_str(&format!("| {} | {} |\n", escape_cell(&summary.title), summary.total));
        }
        section.push('\n');
    }

    section
}

fn generate_questions_section(payload: &AnalyticsPayload, formatter: &Formatter) -> String {
    let mut section = String::new();

    section.push_str("## Pertanyaan\n\n");

    if payload.analytics.is_empty() {
        section.push_str("Survei ini belum memiliki pertanyaan.\n\n");
        return section;
    }

    for (name, summary) in &payload.analytics {
        section.push_str(&generate_question_block(name, summary, formatter));
    }

    section
}

fn generate_question_block(name: &str, summary: &QuestionSummary, formatter: &Formatter) -> String {
    let mut block = String::new();

    block.push_str(&format!("### {} {{#{}}}\n\n", escape_inline(&summary.title), anchor(name)));

    match summary.display {
        DisplayMode::List => {
            let entries = summary.entries.as_deref().unwrap_or_default();
            block.push_str(&format!("*Total jawaban: {}*\n\n", entries.len()));

            if entries.is_empty() {
                block.push_str("Tidak ada data.\n\n");
            } else {
                for (i, entry) in entries.iter().enumerate() {
                    block.push_str(&format!("{}. {}\n", i + 1, escape_inline(entry)));
                }
                block.push('\n');
            }
        }
        DisplayMode::Distribution => {
            block.push_str(&format!("*Total respon kombinasi: {}*\n\n", summary.total));

            if summary.has_data() {
                block.push_str("| Jawaban | Jumlah | Persentase |\n");
                block.push_str("|:---|---:|---:|\n");
                for (label, count) in &summary.counts {
                    block.push_str(&format!(
                        "| {} | {} | {} |\n",
                        escape_cell(label),
                        count,
                        formatter.percent(summary.share(*count))
                    ));
                }
                block.push('\n');
            } else {
                block.push_str("Tidak ada data.\n\n");
            }

            if let Some(average) = summary.average {
                block.push_str(&format!("> **Rata-rata nilai:** {}\n\n", formatter.average(average)));
            }
        }
    }

    block.push_str("---\n\n");
    block
}

fn generate_footer(app_name: &str) -> String {
    format!(
        "*Laporan ini dibuat secara otomatis oleh sistem survei pada {}*\n",
        app_name
    )
}

fn anchor(name: &str) -> String {
    match slugify(name) {
        slug if slug.is_empty() => "pertanyaan".to_string(),
        slug => format!("q-{}", slug),
    }
}

/// Keep headings, links and list items on one line with literal brackets
/// and emphasis characters.
pub(crate) fn escape_inline(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\r' | '\n' => escaped.push(' '),
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Keep table rows intact when a label contains pipes or line breaks.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
