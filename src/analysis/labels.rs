//! Label resolution.
//!
//! Maps raw stored values (option keys, matrix row and column ids, boolean
//! flags) to display labels using the option lists declared on a question.

use crate::answers::AnswerValue;
use crate::schema::{Element, OptionEntry};
use std::collections::HashMap;

/// Stringified option value to display label.
pub type OptionMap = HashMap<String, String>;

/// Option lists a question can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionList {
    Choices,
    RateValues,
    Rows,
    Columns,
    Items,
    Values,
    Options,
}

/// Lookup order when resolving a leaf answer value.
pub const VALUE_PRIORITY: [OptionList; 6] = [
    OptionList::Choices,
    OptionList::Columns,
    OptionList::RateValues,
    OptionList::Rows,
    OptionList::Values,
    OptionList::Options,
];

/// Lookup order when resolving the key of a keyed answer (a matrix row id).
pub const KEY_PRIORITY: [OptionList; 4] = [
    OptionList::Rows,
    OptionList::Items,
    OptionList::Columns,
    OptionList::Choices,
];

/// Display texts for boolean answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanLabels {
    pub yes: String,
    pub no: String,
}

impl Default for BooleanLabels {
    fn default() -> Self {
        Self {
            yes: "Ya".to_string(),
            no: "Tidak".to_string(),
        }
    }
}

impl BooleanLabels {
    pub fn label(&self, flag: bool) -> &str {
        if flag {
            &self.yes
        } else {
            &self.no
        }
    }
}

/// The option maps of one question, built once and reused for every response.
#[derive(Debug, Clone, Default)]
pub struct QuestionMaps {
    pub choices: OptionMap,
    pub rate_values: OptionMap,
    pub rows: OptionMap,
    pub columns: OptionMap,
    pub items: OptionMap,
    pub values: OptionMap,
    pub options: OptionMap,
    /// Labels for unresolved boolean answers.
    pub booleans: BooleanLabels,
}

impl QuestionMaps {
    /// Build the maps for `question`.
    ///
    /// `defaults` supplies the boolean labels when the question configures
    /// no `labelTrue` / `labelFalse` of its own.
    pub fn build(question: &Element, locale: &str, defaults: &BooleanLabels) -> Self {
        let mut booleans = defaults.clone();
        if let Some(yes) = question.label_true.as_ref().and_then(|t| t.resolve(locale)) {
            booleans.yes = yes;
        }
        if let Some(no) = question.label_false.as_ref().and_then(|t| t.resolve(locale)) {
            booleans.no = no;
        }

        Self {
            choices: map_options(&question.choices, locale),
            rate_values: map_options(&question.rate_values, locale),
            rows: map_options(&question.rows, locale),
            columns: map_options(&question.columns, locale),
            items: map_options(&question.items, locale),
            values: map_options(&question.values, locale),
            options: map_options(&question.options, locale),
            booleans,
        }
    }

    pub fn get(&self, list: OptionList) -> &OptionMap {
        match list {
            OptionList::Choices => &self.choices,
            OptionList::RateValues => &self.rate_values,
            OptionList::Rows => &self.rows,
            OptionList::Columns => &self.columns,
            OptionList::Items => &self.items,
            OptionList::Values => &self.values,
            OptionList::Options => &self.options,
        }
    }

    /// Candidate maps in the given priority order.
    pub fn ordered(&self, priority: &[OptionList]) -> Vec<&OptionMap> {
        priority.iter().map(|list| self.get(*list)).collect()
    }

    /// Label of a leaf value, falling back to boolean labels and then to the
    /// raw stringified value.
    pub fn value_label(&self, value: &AnswerValue) -> String {
        if let Some(label) = resolve_option_label(value, &self.ordered(&VALUE_PRIORITY)) {
            return label;
        }
        if let Some(flag) = value.as_bool() {
            return self.booleans.label(flag).to_string();
        }
        value.scalar_key().unwrap_or_default()
    }

    /// Label of a map key, falling back to the key itself.
    pub fn key_label(&self, key: &str) -> String {
        let key_value = AnswerValue::Text(key.to_string());
        resolve_option_label(&key_value, &self.ordered(&KEY_PRIORITY))
            .unwrap_or_else(|| key.to_string())
    }
}

/// Build a value-to-label map from an option list. Later duplicates win.
pub fn map_options(entries: &[OptionEntry], locale: &str) -> OptionMap {
    entries
        .iter()
        .map(|entry| (entry.value.clone(), entry.label(locale)))
        .collect()
}

/// Resolve a scalar against candidate maps, first map holding the key wins.
///
/// A label distinct from its key gets the key appended in parentheses when
/// the value is numeric, so `"1"` labelled `Sangat Puas` reads
/// `Sangat Puas (1)`. Containers never resolve.
pub fn resolve_option_label(value: &AnswerValue, candidates: &[&OptionMap]) -> Option<String> {
    if !value.is_scalar() {
        return None;
    }
    let key = value.scalar_key()?;

    let label = candidates
        .iter()
        .filter(|map| !map.is_empty())
        .find_map(|map| map.get(&key))?;

    if *label == key {
        Some(label.clone())
    } else if value.is_numeric() {
        Some(format!("{} ({})", label, key))
    } else {
        Some(label.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(pairs: &[(&str, &str)]) -> OptionMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn element(value: serde_json::Value) -> Element {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_numeric_value_gets_code_appended() {
        let choices = map(&[("1", "Sangat Puas")]);
        let label = resolve_option_label(&AnswerValue::Text("1".into()), &[&choices]);
        assert_eq!(label.as_deref(), Some("Sangat Puas (1)"));

        let label = resolve_option_label(&AnswerValue::Number(1.into()), &[&choices]);
        assert_eq!(label.as_deref(), Some("Sangat Puas (1)"));
    }

    #[test]
    fn test_text_value_returns_plain_label() {
        let choices = map(&[("c1", "Baik")]);
        let label = resolve_option_label(&AnswerValue::Text("c1".into()), &[&choices]);
        assert_eq!(label.as_deref(), Some("Baik"));
    }

    #[test]
    fn test_identical_label_returned_as_is() {
        let choices = map(&[("5", "5")]);
        let label = resolve_option_label(&AnswerValue::Text("5".into()), &[&choices]);
        assert_eq!(label.as_deref(), Some("5"));
    }

    #[test]
    fn test_first_map_with_key_wins() {
        let empty = OptionMap::new();
        let first = map(&[("a", "From first")]);
        let second = map(&[("a", "From second")]);
        let label = resolve_option_label(&AnswerValue::Text("a".into()), &[&empty, &first, &second]);
        assert_eq!(label.as_deref(), Some("From first"));
    }

    #[test]
    fn test_unresolved_and_containers() {
        let choices = map(&[("a", "A")]);
        assert_eq!(
            resolve_option_label(&AnswerValue::Text("zzz".into()), &[&choices]),
            None
        );

        let list: AnswerValue = serde_json::from_value(json!(["a"])).unwrap();
        assert_eq!(resolve_option_label(&list, &[&choices]), None);

        let object: AnswerValue = serde_json::from_value(json!({"a": "a"})).unwrap();
        assert_eq!(resolve_option_label(&object, &[&choices]), None);
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let choices = map(&[("2", "Cukup")]);
        let value = AnswerValue::Text("2".into());
        let first = resolve_option_label(&value, &[&choices]);
        let second = resolve_option_label(&value, &[&choices]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_priority_orders_differ() {
        let question = element(json!({
            "name": "m",
            "rows": [{"value": "x", "text": "Row X"}],
            "columns": [{"value": "x", "text": "Column X"}]
        }));
        let maps = QuestionMaps::build(&question, "id", &BooleanLabels::default());

        assert_eq!(maps.key_label("x"), "Row X");
        assert_eq!(maps.value_label(&AnswerValue::Text("x".into())), "Column X");
        assert_eq!(maps.key_label("unknown"), "unknown");
    }

    #[test]
    fn test_boolean_labels() {
        let plain = element(json!({"name": "agree", "type": "boolean"}));
        let maps = QuestionMaps::build(&plain, "id", &BooleanLabels::default());
        assert_eq!(maps.value_label(&AnswerValue::Bool(true)), "Ya");
        assert_eq!(maps.value_label(&AnswerValue::Bool(false)), "Tidak");

        let custom = element(json!({
            "name": "agree",
            "type": "boolean",
            "labelTrue": "Setuju",
            "labelFalse": {"default": "Disagree", "id": "Tidak Setuju"}
        }));
        let maps = QuestionMaps::build(&custom, "id", &BooleanLabels::default());
        assert_eq!(maps.value_label(&AnswerValue::Bool(true)), "Setuju");
        assert_eq!(maps.value_label(&AnswerValue::Bool(false)), "Tidak Setuju");
    }

    #[test]
    fn test_unresolved_value_falls_back_to_raw() {
        let maps = QuestionMaps::default();
        assert_eq!(maps.value_label(&AnswerValue::Text("Jakarta".into())), "Jakarta");
        assert_eq!(maps.value_label(&AnswerValue::Number(7.into())), "7");
    }
}
