//! Survey schema model.
//!
//! The schema is produced by the form builder and is only read here. Every
//! field is optional and deserialized leniently: a field of the wrong shape
//! reads as absent, a malformed list item is dropped.

use crate::answers::AnswerValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The page/element tree of one survey.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveySchema {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub title: Option<LocalizedText>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(default, deserialize_with = "lenient::name")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub elements: Vec<Element>,
}

/// A question or a container of questions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Stable answer key.
    #[serde(default, deserialize_with = "lenient::name")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub title: Option<LocalizedText>,

    #[serde(default, rename = "type", deserialize_with = "lenient::opt")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub input_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::options")]
    pub choices: Vec<OptionEntry>,

    #[serde(default, deserialize_with = "lenient::options")]
    pub rate_values: Vec<OptionEntry>,

    #[serde(default, deserialize_with = "lenient::options")]
    pub rows: Vec<OptionEntry>,

    #[serde(default, deserialize_with = "lenient::options")]
    pub columns: Vec<OptionEntry>,

    #[serde(default, deserialize_with = "lenient::options")]
    pub items: Vec<OptionEntry>,

    #[serde(default, deserialize_with = "lenient::options")]
    pub values: Vec<OptionEntry>,

    #[serde(default, deserialize_with = "lenient::options")]
    pub options: Vec<OptionEntry>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub label_true: Option<LocalizedText>,

    #[serde(default, deserialize_with = "lenient::opt")]
    pub label_false: Option<LocalizedText>,

    /// Nested elements of a panel.
    #[serde(default, deserialize_with = "lenient::seq")]
    pub elements: Vec<Element>,
}

impl Element {
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind() == Some(kind)
    }

    pub fn is_panel(&self) -> bool {
        self.is_kind("panel")
    }

    /// Display title for `locale`, falling back to the name.
    pub fn display_title(&self, locale: &str) -> String {
        self.title
            .as_ref()
            .and_then(|title| title.resolve(locale))
            .or_else(|| self.name.clone())
            .unwrap_or_default()
    }
}

impl SurveySchema {
    /// Questions in schema order.
    ///
    /// Panels are flattened into their children; unnamed elements are
    /// skipped.
    pub fn questions(&self) -> Vec<&Element> {
        let mut questions = Vec::new();
        for page in &self.pages {
            collect_questions(&page.elements, &mut questions);
        }
        questions
    }
}

fn collect_questions<'a>(elements: &'a [Element], out: &mut Vec<&'a Element>) {
    for element in elements {
        if element.is_panel() {
            collect_questions(&element.elements, out);
            continue;
        }
        if element.name.is_some() {
            out.push(element);
        }
    }
}

/// A display text that is either plain or keyed by locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized(IndexMap<String, Value>),
}

impl LocalizedText {
    /// Resolve to non-blank text.
    ///
    /// Localized texts try `locale`, its underscore form, `default`, then
    /// the first non-blank translation.
    pub fn resolve(&self, locale: &str) -> Option<String> {
        match self {
            LocalizedText::Plain(text) => non_blank(text),
            LocalizedText::Localized(translations) => {
                let mut candidates = Vec::new();
                if !locale.is_empty() {
                    candidates.push(locale.to_string());
                    candidates.push(locale.replace('-', "_"));
                }
                candidates.push("default".to_string());

                candidates
                    .iter()
                    .filter_map(|key| translations.get(key))
                    .chain(translations.values())
                    .filter_map(Value::as_str)
                    .find_map(non_blank)
            }
        }
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// One entry of an option list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionEntry {
    /// Stored value, stringified.
    pub value: String,
    /// Configured display text, if distinct from the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<LocalizedText>,
}

impl OptionEntry {
    /// Interpret a raw option list item.
    ///
    /// Scalars are their own label. Records take `value`, `id` or `name` as
    /// the value and `text`, `title` or `label` as the label; a record with
    /// only a label uses it as the value, a record with neither is skipped.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(record) => {
                let text = ["text", "title", "label"]
                    .iter()
                    .find_map(|key| record.get(*key).filter(|v| !v.is_null()))
                    .and_then(option_text);

                let stored = ["value", "id", "name"]
                    .iter()
                    .find_map(|key| record.get(*key).filter(|v| !v.is_null()))
                    .and_then(|raw| AnswerValue::from(raw.clone()).scalar_key());

                let stored = match (stored, &text) {
                    (Some(stored), _) => stored,
                    (None, Some(text)) => text.resolve("")?,
                    (None, None) => return None,
                };

                Some(Self {
                    value: stored,
                    text,
                })
            }
            Value::Array(_) | Value::Null => None,
            scalar => AnswerValue::from(scalar.clone())
                .scalar_key()
                .map(|value| Self { value, text: None }),
        }
    }

    /// Label for `locale`; the value itself when no text is configured.
    pub fn label(&self, locale: &str) -> String {
        self.text
            .as_ref()
            .and_then(|text| text.resolve(locale))
            .unwrap_or_else(|| self.value.clone())
    }
}

/// Option label from a raw value; numbers and booleans become plain text.
fn option_text(raw: &Value) -> Option<LocalizedText> {
    match raw {
        Value::Bool(_) | Value::Number(_) => AnswerValue::from(raw.clone())
            .scalar_key()
            .map(LocalizedText::Plain),
        Value::String(_) | Value::Object(_) => serde_json::from_value(raw.clone()).ok(),
        Value::Array(_) | Value::Null => None,
    }
}

/// Lenient field deserializers.
mod lenient {
    use super::OptionEntry;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// A list whose malformed items are dropped; anything but a list is empty.
    pub fn seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }

    /// An optional value that reads as `None` when it has the wrong shape.
    pub fn opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }

    /// A non-empty name; numbers are accepted in their string form.
    pub fn name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(name) if !name.is_empty() => Some(name),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
    }

    pub fn options<'de, D>(deserializer: D) -> Result<Vec<OptionEntry>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.iter().filter_map(OptionEntry::from_value).collect(),
            _ => Vec::new(),
        })
    }
}
