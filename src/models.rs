//! Data models for the analytics payload.
//!
//! These structures are derived from a schema and a response corpus on
//! every request and handed to the exporters unchanged.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a question's results are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Label counts with percentages.
    #[default]
    Distribution,
    /// Every answer listed individually (free text).
    List,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Distribution => write!(f, "distribution"),
            DisplayMode::List => write!(f, "list"),
        }
    }
}

/// Aggregated results of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    /// Display title of the question.
    pub title: String,
    /// Label to occurrence count, ordered by count descending.
    pub counts: IndexMap<String, usize>,
    /// Sum of all counts.
    pub total: usize,
    /// Mean of the numeric raw values, if any.
    pub average: Option<f64>,
    /// Question type from the schema.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default)]
    pub display: DisplayMode,
    /// Every label in encounter order, for list questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<String>>,
}

impl QuestionSummary {
    /// Creates a summary with no answers.
    #[cfg(test)]
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            counts: IndexMap::new(),
            total: 0,
            average: None,
            kind: None,
            input_type: None,
            display: DisplayMode::Distribution,
            entries: None,
        }
    }

    pub fn has_data(&self) -> bool {
        !self.counts.is_empty()
    }

    /// Share of `count` in the question total, between 0 and 1.
    pub fn share(&self, count: usize) -> f64 {
        let total = if self.total > 0 {
            self.total
        } else {
            self.counts.values().sum()
        };

        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    }
}

/// Survey-wide statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyStats {
    pub total_responses: usize,
    pub total_questions: usize,
    /// One per response per question with at least one non-empty entry.
    pub total_answered: usize,
    /// Whole percent of answered response/question slots.
    pub completion_rate: u32,
}

impl SurveyStats {
    /// Creates the statistics, deriving the completion rate.
    pub fn new(total_responses: usize, total_questions: usize, total_answered: usize) -> Self {
        let slots = total_responses * total_questions;
        let completion_rate = if slots == 0 {
            0
        } else {
            let percent = (total_answered as f64 / slots as f64 * 100.0).round();
            percent.clamp(0.0, 100.0) as u32
        };

        Self {
            total_responses,
            total_questions,
            total_answered,
            completion_rate,
        }
    }
}

/// The complete analytics payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsPayload {
    /// Question name to summary, in schema order.
    pub analytics: IndexMap<String, QuestionSummary>,
    pub stats: SurveyStats,
}

/// Survey identity and generation time, shown in exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub survey_title: String,
    pub generated_at: DateTime<Utc>,
}

impl ReportMetadata {
    pub fn new(survey_title: impl Into<String>) -> Self {
        Self {
            survey_title: survey_title.into(),
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate() {
        assert_eq!(SurveyStats::new(3, 2, 3).completion_rate, 50);
        assert_eq!(SurveyStats::new(3, 3, 2).completion_rate, 22);
        assert_eq!(SurveyStats::new(2, 3, 5).completion_rate, 83);
        assert_eq!(SurveyStats::new(4, 2, 8).completion_rate, 100);
    }

    #[test]
    fn test_completion_rate_zero_denominator() {
        assert_eq!(SurveyStats::new(0, 5, 0).completion_rate, 0);
        assert_eq!(SurveyStats::new(5, 0, 0).completion_rate, 0);
    }

    #[test]
    fn test_share() {
        let mut summary = QuestionSummary::empty("Q");
        summary.counts.insert("A".to_string(), 3);
        summary.counts.insert("B".to_string(), 1);
        summary.total = 4;

        assert_eq!(summary.share(3), 0.75);
        assert_eq!(QuestionSummary::empty("E").share(0), 0.0);
    }

    #[test]
    fn test_payload_serialization() {
        let mut payload = AnalyticsPayload::default();
        payload
            .analytics
            .insert("q1".to_string(), QuestionSummary::empty("Question 1"));
        payload.stats = SurveyStats::new(0, 1, 0);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["analytics"]["q1"]["average"], serde_json::Value::Null);
        assert_eq!(json["analytics"]["q1"]["display"], "distribution");
        assert_eq!(json["stats"]["totalQuestions"], 1);
        assert_eq!(json["stats"]["completionRate"], 0);
        assert!(json["analytics"]["q1"].get("entries").is_none());
    }
}
