//! Answer aggregation and survey statistics.
//!
//! Walks the schema once and, for each question, scans every response,
//! tallying entry labels and averaging numeric raw values.

use super::extractor::extract_entries;
use super::labels::{BooleanLabels, QuestionMaps};
use crate::answers::ResponseDocument;
use crate::models::{AnalyticsPayload, DisplayMode, QuestionSummary, SurveyStats};
use crate::schema::{Element, SurveySchema};
use indexmap::IndexMap;
use tracing::{debug, info};

/// Settings that shape aggregation.
#[derive(Debug, Clone)]
pub struct AggregationOptions {
    /// Locale used for localized titles and option texts.
    pub locale: String,
    /// Question types whose answers are listed instead of charted.
    pub list_types: Vec<String>,
    /// Input types that keep a list-type question charted.
    pub numeric_input_types: Vec<String>,
    /// Fallback labels for boolean answers.
    pub booleans: BooleanLabels,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            locale: "id".to_string(),
            list_types: vec!["text".to_string(), "comment".to_string()],
            numeric_input_types: vec!["number".to_string(), "range".to_string()],
            booleans: BooleanLabels::default(),
        }
    }
}

impl From<&crate::config::AnalyticsConfig> for AggregationOptions {
    fn from(config: &crate::config::AnalyticsConfig) -> Self {
        Self {
            locale: config.locale.clone(),
            list_types: config.list_types.clone(),
            numeric_input_types: config.numeric_input_types.clone(),
            booleans: BooleanLabels {
                yes: config.boolean_true_label.clone(),
                no: config.boolean_false_label.clone(),
            },
        }
    }
}

impl AggregationOptions {
    /// Presentation mode of `question`.
    pub fn display_mode(&self, question: &Element) -> DisplayMode {
        let Some(kind) = question.kind() else {
            return DisplayMode::Distribution;
        };
        if !self.list_types.iter().any(|t| t == kind) {
            return DisplayMode::Distribution;
        }
        let numeric_input = question
            .input_type
            .as_deref()
            .is_some_and(|input| self.numeric_input_types.iter().any(|t| t == input));

        if numeric_input {
            DisplayMode::Distribution
        } else {
            DisplayMode::List
        }
    }
}

/// Build the analytics payload for a survey.
pub fn build_analytics_payload(
    schema: &SurveySchema,
    responses: &[ResponseDocument],
    options: &AggregationOptions,
) -> AnalyticsPayload {
    let questions = schema.questions();
    let mut analytics = IndexMap::new();
    let mut total_answered = 0;

    for question in &questions {
        let Some(name) = question.name.as_deref() else {
            continue;
        };

        let (summary, answered) = summarize_question(question, name, responses, options);
        debug!(
            "Question {}: {} answered, {} labels, total {}",
            name,
            answered,
            summary.counts.len(),
            summary.total
        );

        total_answered += answered;
        analytics.insert(name.to_string(), summary);
    }

    let stats = SurveyStats::new(responses.len(), questions.len(), total_answered);
    info!(
        "Aggregated {} questions over {} responses ({}% complete)",
        stats.total_questions, stats.total_responses, stats.completion_rate
    );

    AnalyticsPayload { analytics, stats }
}

/// Summarize one question. Returns the summary and its answered count.
fn summarize_question(
    question: &Element,
    name: &str,
    responses: &[ResponseDocument],
    options: &AggregationOptions,
) -> (QuestionSummary, usize) {
    let maps = QuestionMaps::build(question, &options.locale, &options.booleans);
    let display = options.display_mode(question);

    let mut counts: IndexMap<String, usize> = IndexMap::new();
    let mut listed = Vec::new();
    let mut sum = 0.0;
    let mut numeric = 0usize;
    let mut answered = 0;

    for response in responses {
        let entries = extract_entries(response.answer(name), &maps);
        if entries.is_empty() {
            continue;
        }
        answered += 1;

        for entry in entries {
            if let Some(value) = entry.raw.as_f64() {
                sum += value;
                numeric += 1;
            }
            *counts.entry(entry.label.clone()).or_insert(0) += 1;
            if display == DisplayMode::List {
                listed.push(entry.label);
            }
        }
    }

    sort_counts_desc(&mut counts);

    let summary = QuestionSummary {
        title: question.display_title(&options.locale),
        total: counts.values().sum(),
        counts,
        average: (numeric > 0).then(|| sum / numeric as f64),
        kind: question.kind.clone(),
        input_type: question.input_type.clone(),
        display,
        entries: (display == DisplayMode::List).then_some(listed),
    };

    (summary, answered)
}

/// Order counts by count descending, keeping first-seen order on ties.
pub fn sort_counts_desc(counts: &mut IndexMap<String, usize>) {
    counts.sort_by(|_, a, _, b| b.cmp(a));
}

/// Questions with data, ordered by total answers (highest first).
pub fn most_answered_questions(payload: &AnalyticsPayload, n: usize) -> Vec<(&str, &QuestionSummary)> {
    let mut questions: Vec<_> = payload
        .analytics
        .iter()
        .filter(|(_, summary)| summary.has_data())
        .map(|(name, summary)| (name.as_str(), summary))
        .collect();

    questions.sort_by_key(|(_, summary)| std::cmp::Reverse(summary.total));
    questions.truncate(n);
    questions
}

/// Questions charted as distributions that have data, in schema order.
pub fn chartable_questions(payload: &AnalyticsPayload) -> impl Iterator<Item = (&str, &QuestionSummary)> {
    payload
        .analytics
        .iter()
        .filter(|(_, summary)| summary.display == DisplayMode::Distribution && summary.has_data())
        .map(|(name, summary)| (name.as_str(), summary))
}
