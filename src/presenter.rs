//! Human-readable presentation of single responses.
//!
//! Unlike the aggregator, the presenter keeps one flat value map per
//! question and renders a whole answer as one line of text.

use crate::analysis::labels::BooleanLabels;
use crate::answers::{parse_timestamp, AnswerValue, ResponseDocument};
use crate::report::markdown::escape_inline;
use crate::report::Formatter;
use crate::schema::{Element, OptionEntry, SurveySchema};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

/// Suffix of the answer key holding a question's free-text comment.
pub const COMMENT_SUFFIX: &str = "-Comment";

const COMMENT_SEPARATOR: &str = " — ";
const PART_SEPARATOR: &str = ", ";

/// What the presenter knows about one question.
#[derive(Debug, Clone)]
pub struct QuestionDefinition {
    pub name: String,
    pub title: String,
    value_map: HashMap<String, String>,
}

/// One presented answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentedAnswer {
    pub name: String,
    pub title: String,
    pub value: String,
}

/// One presented response.
#[derive(Debug, Clone, Serialize)]
pub struct PresentedResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    pub answers: Vec<PresentedAnswer>,
}

/// Renders responses against a fixed set of question definitions.
#[derive(Debug, Clone)]
pub struct ResponsePresenter {
    definitions: IndexMap<String, QuestionDefinition>,
    booleans: BooleanLabels,
}

impl ResponsePresenter {
    pub fn new(schema: &SurveySchema, locale: &str, booleans: BooleanLabels) -> Self {
        Self {
            definitions: collect_definitions(schema, locale),
            booleans,
        }
    }

    #[cfg(test)]
    pub fn definitions(&self) -> impl Iterator<Item = &QuestionDefinition> {
        self.definitions.values()
    }

    /// Present every answered question of `response`, in schema order.
    pub fn present(&self, response: &ResponseDocument) -> PresentedResponse {
        let mut answers = Vec::new();

        for definition in self.definitions.values() {
            let Some(raw) = response.answers.get(&definition.name) else {
                continue;
            };

            let mut value = self.present_value(raw, &definition.value_map);

            let comment_key = format!("{}{}", definition.name, COMMENT_SUFFIX);
            if let Some(raw_comment) = response.answers.get(&comment_key) {
                let comment = self.present_value(raw_comment, &HashMap::new());
                if !comment.is_empty() {
                    value = if value.is_empty() {
                        comment
                    } else {
                        format!("{}{}{}", value, COMMENT_SEPARATOR, comment)
                    };
                }
            }

            if value.is_empty() {
                continue;
            }

            answers.push(PresentedAnswer {
                name: definition.name.clone(),
                title: definition.title.clone(),
                value,
            });
        }

        PresentedResponse {
            response_uuid: response.response_uuid.clone(),
            submitted_at: response.submitted_at.clone(),
            answers,
        }
    }

    fn present_value(&self, raw: &AnswerValue, map: &HashMap<String, String>) -> String {
        match raw {
            AnswerValue::Null => String::new(),
            AnswerValue::Text(text) if text.is_empty() => String::new(),
            AnswerValue::List(items) => join_unique(
                items
                    .iter()
                    .map(|item| self.present_value(item, map))
                    .collect(),
            ),
            AnswerValue::Map(entries) => join_unique(
                entries
                    .iter()
                    .filter_map(|(key, value)| {
                        let label = self.present_value(value, map);
                        if label.is_empty() {
                            return None;
                        }
                        let key_label = map.get(key).map(String::as_str).unwrap_or(key.as_str());
                        Some(if key_label.is_empty() {
                            label
                        } else {
                            format!("{}: {}", key_label, label)
                        })
                    })
                    .collect(),
            ),
            scalar => self.label_for(scalar, map),
        }
    }

    fn label_for(&self, value: &AnswerValue, map: &HashMap<String, String>) -> String {
        let key = value.scalar_key().unwrap_or_default();
        if let Some(label) = map.get(&key) {
            return label.clone();
        }
        match value.as_bool() {
            Some(flag) => self.booleans.label(flag).to_string(),
            None => key,
        }
    }
}

/// Keep the first occurrence of each non-empty part.
fn join_unique(parts: Vec<String>) -> String {
    let mut unique: Vec<String> = Vec::with_capacity(parts.len());
    for part in parts {
        if !part.is_empty() && !unique.contains(&part) {
            unique.push(part);
        }
    }
    unique.join(PART_SEPARATOR)
}

fn collect_definitions(schema: &SurveySchema, locale: &str) -> IndexMap<String, QuestionDefinition> {
    let mut definitions = IndexMap::new();
    for page in &schema.pages {
        walk_elements(&page.elements, locale, &mut definitions);
    }
    definitions
}

fn walk_elements(
    elements: &[Element],
    locale: &str,
    definitions: &mut IndexMap<String, QuestionDefinition>,
) {
    for element in elements {
        walk_elements(&element.elements, locale, definitions);

        let (Some(name), Some(kind)) = (element.name.as_deref(), element.kind()) else {
            continue;
        };
        if kind.is_empty() || matches!(kind, "panel" | "paneldynamic") {
            continue;
        }
        if definitions.contains_key(name) {
            continue;
        }

        definitions.insert(
            name.to_string(),
            QuestionDefinition {
                name: name.to_string(),
                title: element.display_title(locale),
                value_map: value_label_map(element, locale),
            },
        );
    }
}

/// Flat value-to-label map; later lists overwrite earlier keys.
fn value_label_map(element: &Element, locale: &str) -> HashMap<String, String> {
    let sources: [&[OptionEntry]; 4] = [
        &element.choices,
        &element.rate_values,
        &element.columns,
        &element.rows,
    ];

    let mut map = HashMap::new();
    for entry in sources.into_iter().flatten() {
        map.insert(entry.value.clone(), entry.label(locale));
    }

    if element.is_kind("boolean") {
        if let Some(label) = element.label_true.as_ref().and_then(|t| t.resolve(locale)) {
            map.insert("true".to_string(), label);
        }
        if let Some(label) = element.label_false.as_ref().and_then(|t| t.resolve(locale)) {
            map.insert("false".to_string(), label);
        }
    }

    map
}

/// Responses newest first; those without a readable timestamp go last.
pub fn latest_first(responses: &[ResponseDocument]) -> Vec<&ResponseDocument> {
    let mut ordered: Vec<&ResponseDocument> = responses.iter().collect();
    ordered.sort_by(|a, b| b.submitted_at_utc().cmp(&a.submitted_at_utc()));
    ordered
}

/// Render presented responses as Markdown, one section per response.
pub fn render_markdown(responses: &[PresentedResponse], formatter: &Formatter) -> String {
    let mut output = String::from("# Respon Survei\n\n");

    if responses.is_empty() {
        output.push_str("Belum ada respon.\n");
        return output;
    }

    for (i, response) in responses.iter().enumerate() {
        let heading = response
            .response_uuid
            .clone()
            .unwrap_or_else(|| format!("Respon #{}", i + 1));
        output.push_str(&format!("## {}\n\n", escape_inline(&heading)));

        if let Some(submitted_at) = response.submitted_at.as_deref() {
            let shown = match parse_timestamp(submitted_at) {
                Some(at) => formatter.timestamp(&at),
                None => submitted_at.to_string(),
            };
            output.push_str(&format!("*Dikirim: {}*\n\n", shown));
        }

        if response.answers.is_empty() {
            output.push_str("Tidak ada jawaban.\n\n");
            continue;
        }

        for answer in &response.answers {
            output.push_str(&format!(
                "- **{}:** {}\n",
                escape_inline(&answer.title),
                escape_inline(&answer.value)
            ));
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn schema() -> SurveySchema {
        serde_json::from_value(json!({
            "pages": [{
                "elements": [
                    {"type": "radiogroup", "name": "puas", "title": "Kepuasan",
                     "choices": [{"value": "1", "text": "Sangat Puas"}, "2"]},
                    {"type": "boolean", "name": "setuju", "labelTrue": "Setuju"},
                    {"type": "boolean", "name": "lanjut"},
                    {"type": "panel", "name": "grup", "elements": [
                        {"type": "checkbox", "name": "fasilitas",
                         "choices": [{"value": "wifi", "text": "WiFi"}, {"value": "ac", "text": "AC"}]},
                        {"type": "text", "name": "puas", "title": "Duplikat"}
                    ]},
                    {"type": "matrix", "name": "nilai",
                     "rows": [{"value": "r1", "text": "Kebersihan"}],
                     "columns": [{"value": "c1", "text": "Baik"}]},
                    {"name": "tanpa_tipe"}
                ]
            }]
        }))
        .unwrap()
    }

    fn presenter() -> ResponsePresenter {
        ResponsePresenter::new(&schema(), "id", BooleanLabels::default())
    }

    fn response(answers: Value) -> ResponseDocument {
        ResponseDocument::from_answers(serde_json::from_value(answers).unwrap())
    }

    fn values(presented: &PresentedResponse) -> Vec<(&str, &str)> {
        presented
            .answers
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect()
    }

    #[test]
    fn test_definitions_skip_panels_and_keep_first() {
        let presenter = presenter();
        let names: Vec<_> = presenter.definitions().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["puas", "setuju", "lanjut", "fasilitas", "nilai"]);

        let puas = presenter.definitions().next().unwrap();
        assert_eq!(puas.title, "Kepuasan");
    }

    #[test]
    fn test_present_scalars_and_booleans() {
        let presented = presenter().present(&response(json!({
            "puas": "1",
            "setuju": true,
            "lanjut": false,
            "fasilitas": ["wifi", "ac", "wifi", ""],
        })));

        assert_eq!(
            values(&presented),
            vec![
                ("puas", "Sangat Puas"),
                ("setuju", "Setuju"),
                ("lanjut", "Tidak"),
                ("fasilitas", "WiFi, AC"),
            ]
        );
    }

    #[test]
    fn test_present_map_answer() {
        let presented = presenter().present(&response(json!({"nilai": {"r1": "c1", "r2": ""}})));
        assert_eq!(values(&presented), vec![("nilai", "Kebersihan: Baik")]);
    }

    #[test]
    fn test_comment_is_appended() {
        let presented = presenter().present(&response(json!({
            "puas": "2",
            "puas-Comment": "ramah sekali",
            "setuju": "",
            "setuju-Comment": "lainnya",
        })));

        assert_eq!(
            values(&presented),
            vec![("puas", "2 — ramah sekali"), ("setuju", "lainnya")]
        );
    }

    #[test]
    fn test_unanswered_and_empty_omitted() {
        let presented = presenter().present(&response(json!({
            "puas": null,
            "fasilitas": [],
            "unknown": "x",
        })));
        assert!(presented.answers.is_empty());
    }

    #[test]
    fn test_latest_first() {
        let mut old = response(json!({}));
        old.submitted_at = Some("2025-01-01 00:00:00".to_string());
        let mut new = response(json!({}));
        new.submitted_at = Some("2025-03-01T00:00:00Z".to_string());
        let undated = response(json!({}));

        let docs = vec![old.clone(), undated, new.clone()];
        let ordered = latest_first(&docs);
        assert_eq!(ordered[0], &new);
        assert_eq!(ordered[1], &old);
        assert!(ordered[2].submitted_at.is_none());
    }

    #[test]
    fn test_render_markdown() {
        let mut doc = response(json!({"puas": "1"}));
        doc.response_uuid = Some("abc-123".to_string());
        doc.submitted_at = Some("2025-01-01T00:00:00Z".to_string());
        let presented = vec![presenter().present(&doc), presenter().present(&response(json!({})))];

        let markdown = render_markdown(&presented, &Formatter::default());
        assert!(markdown.contains("## abc-123"));
        assert!(markdown.contains("*Dikirim: 01-01-2025 07:00*"));
        assert!(markdown.contains("- **Kepuasan:** Sangat Puas"));
        assert!(markdown.contains("## Respon #2"));
        assert!(markdown.contains("Tidak ada jawaban."));
    }

    #[test]
    fn test_render_markdown_keeps_answers_on_one_line() {
        let presented = vec![PresentedResponse {
            response_uuid: None,
            submitted_at: None,
            answers: vec![PresentedAnswer {
                name: "saran".to_string(),
                title: "Saran*".to_string(),
                value: "baris satu\nbaris [dua]".to_string(),
            }],
        }];

        let markdown = render_markdown(&presented, &Formatter::default());
        assert!(markdown.contains("- **Saran\\*:** baris satu baris \\[dua\\]\n"));
    }
}
