//! Respondent answers.
//!
//! An answer is an arbitrary JSON value. Lists and keyed maps are distinct
//! variants from the moment the document is deserialized, so the extraction
//! code matches on shape instead of inspecting keys at runtime.

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// One raw answer value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<AnswerValue>),
    Map(IndexMap<String, AnswerValue>),
}

impl AnswerValue {
    /// Returns true if the answer carries nothing worth counting.
    ///
    /// Blank text, empty containers and containers holding only empty
    /// values are all empty.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Null => true,
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::List(items) => items.iter().all(AnswerValue::is_empty),
            AnswerValue::Map(entries) => entries.values().all(AnswerValue::is_empty),
            AnswerValue::Bool(_) | AnswerValue::Number(_) => false,
        }
    }

    /// Returns true for scalars (including null).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, AnswerValue::List(_) | AnswerValue::Map(_))
    }

    /// String form used as an option-map key. `None` for containers.
    pub fn scalar_key(&self) -> Option<String> {
        match self {
            AnswerValue::Null => Some(String::new()),
            AnswerValue::Bool(flag) => Some(flag.to_string()),
            AnswerValue::Number(number) => Some(number_key(number)),
            AnswerValue::Text(text) => Some(text.clone()),
            AnswerValue::List(_) | AnswerValue::Map(_) => None,
        }
    }

    /// Numeric value if the answer is a number or numeric text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(number) => number.as_f64(),
            AnswerValue::Text(text) => parse_numeric(text),
            _ => None,
        }
    }

    /// Returns true if the answer can be coerced to a number.
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnswerValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }
}

impl From<Value> for AnswerValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AnswerValue::Null,
            Value::Bool(flag) => AnswerValue::Bool(flag),
            Value::Number(number) => AnswerValue::Number(number),
            Value::String(text) => AnswerValue::Text(text),
            Value::Array(items) => {
                AnswerValue::List(items.into_iter().map(AnswerValue::from).collect())
            }
            Value::Object(entries) => AnswerValue::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, AnswerValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&AnswerValue> for Value {
    fn from(value: &AnswerValue) -> Self {
        match value {
            AnswerValue::Null => Value::Null,
            AnswerValue::Bool(flag) => Value::Bool(*flag),
            AnswerValue::Number(number) => Value::Number(number.clone()),
            AnswerValue::Text(text) => Value::String(text.clone()),
            AnswerValue::List(items) => Value::Array(items.iter().map(Value::from).collect()),
            AnswerValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Key form of a JSON number: integers without a fraction part.
fn number_key(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(int) = number.as_u64() {
        return int.to_string();
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => (float as i64).to_string(),
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

/// Parse text as a finite decimal number, ignoring surrounding whitespace.
///
/// Only digits, signs, a decimal point and an exponent marker are accepted,
/// which keeps `inf`, `nan` and hex literals out.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let allowed = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !allowed {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// One respondent's submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseDocument {
    /// Public identifier of the response, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_uuid: Option<String>,

    /// Submission timestamp as stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,

    /// Answers keyed by question name.
    #[serde(default)]
    pub answers: IndexMap<String, AnswerValue>,
}

impl ResponseDocument {
    /// Build a response from an answers mapping only.
    pub fn from_answers(answers: IndexMap<String, AnswerValue>) -> Self {
        Self {
            response_uuid: None,
            submitted_at: None,
            answers,
        }
    }

    /// Raw answer for a question, `Null` when absent.
    pub fn answer(&self, name: &str) -> &AnswerValue {
        static NULL: AnswerValue = AnswerValue::Null;
        self.answers.get(name).unwrap_or(&NULL)
    }

    /// Submission time, accepting RFC 3339 and `YYYY-mm-dd HH:MM:SS`.
    pub fn submitted_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.submitted_at.as_deref()?)
    }
}

/// Parse a stored timestamp: RFC 3339, or `YYYY-mm-dd HH:MM:SS` taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answer(value: Value) -> AnswerValue {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_deserialize_shapes() {
        assert_eq!(answer(json!(null)), AnswerValue::Null);
        assert_eq!(answer(json!(true)), AnswerValue::Bool(true));
        assert_eq!(answer(json!("x")), AnswerValue::Text("x".to_string()));
        assert!(matches!(answer(json!([1, 2])), AnswerValue::List(items) if items.len() == 2));
        assert!(matches!(answer(json!({"r1": "c1"})), AnswerValue::Map(_)));
    }

    #[test]
    fn test_map_keeps_document_order() {
        let value = answer(json!({"zeta": 1, "alpha": 2, "mid": 3}));
        let AnswerValue::Map(entries) = value else {
            panic!("expected a map");
        };
        let keys: Vec<_> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_is_empty() {
        assert!(answer(json!(null)).is_empty());
        assert!(answer(json!("   ")).is_empty());
        assert!(answer(json!([])).is_empty());
        assert!(answer(json!(["", null, [" "]])).is_empty());
        assert!(answer(json!({"a": ""})).is_empty());
        assert!(!answer(json!(false)).is_empty());
        assert!(!answer(json!(0)).is_empty());
        assert!(!answer(json!(["", "x"])).is_empty());
    }

    #[test]
    fn test_scalar_key() {
        assert_eq!(answer(json!(3)).scalar_key().as_deref(), Some("3"));
        assert_eq!(answer(json!(2.0)).scalar_key().as_deref(), Some("2"));
        assert_eq!(answer(json!(2.5)).scalar_key().as_deref(), Some("2.5"));
        assert_eq!(answer(json!(true)).scalar_key().as_deref(), Some("true"));
        assert_eq!(answer(json!([1])).scalar_key(), None);
    }

    #[test]
    fn test_numeric_detection() {
        assert!(answer(json!("5")).is_numeric());
        assert!(answer(json!(" 2.5 ")).is_numeric());
        assert!(answer(json!("-1e3")).is_numeric());
        assert!(answer(json!(".5")).is_numeric());
        assert!(answer(json!(4)).is_numeric());
        assert!(!answer(json!("inf")).is_numeric());
        assert!(!answer(json!("NaN")).is_numeric());
        assert!(!answer(json!("0x1A")).is_numeric());
        assert!(!answer(json!("")).is_numeric());
        assert!(!answer(json!(true)).is_numeric());
        assert!(!answer(json!("Baik")).is_numeric());
    }

    #[test]
    fn test_submitted_at_formats() {
        let mut doc = ResponseDocument::default();
        doc.submitted_at = Some("2025-09-23T10:00:00+07:00".to_string());
        assert_eq!(
            doc.submitted_at_utc().unwrap().to_rfc3339(),
            "2025-09-23T03:00:00+00:00"
        );

        doc.submitted_at = Some("2025-09-23 10:00:00".to_string());
        assert!(doc.submitted_at_utc().is_some());

        doc.submitted_at = Some("yesterday".to_string());
        assert!(doc.submitted_at_utc().is_none());
    }
}
