//! Flattening of nested answers into labelled entries.

use super::labels::QuestionMaps;
use crate::answers::AnswerValue;
use serde::Serialize;

/// Separator between the parts of a composite label.
pub const LABEL_SEPARATOR: &str = " – ";

/// Label used when every part of a composite label is blank.
pub const EMPTY_LABEL: &str = "-";

/// One leaf value of an answer together with its display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerEntry {
    pub raw: AnswerValue,
    pub label: String,
}

/// Extract one entry per non-empty leaf of `answer`.
///
/// Keys of keyed answers (matrix rows, dynamic panel fields) become context
/// parts of the labels of everything below them.
pub fn extract_entries(answer: &AnswerValue, maps: &QuestionMaps) -> Vec<AnswerEntry> {
    let mut entries = Vec::new();
    collect(answer, maps, &mut Vec::new(), &mut entries);
    entries
}

fn collect(
    answer: &AnswerValue,
    maps: &QuestionMaps,
    context: &mut Vec<String>,
    out: &mut Vec<AnswerEntry>,
) {
    if answer.is_empty() {
        return;
    }

    match answer {
        AnswerValue::List(items) => {
            for item in items {
                collect(item, maps, context, out);
            }
        }
        AnswerValue::Map(fields) => {
            for (key, value) in fields {
                if value.is_empty() {
                    continue;
                }
                context.push(maps.key_label(key));
                collect(value, maps, context, out);
                context.pop();
            }
        }
        leaf => {
            let value_label = maps.value_label(leaf);
            let parts = context.iter().map(String::as_str).chain([value_label.as_str()]);
            out.push(AnswerEntry {
                raw: leaf.clone(),
                label: compose_label(parts),
            });
        }
    }
}

/// Join trimmed, non-blank, distinct parts with [`LABEL_SEPARATOR`].
pub fn compose_label<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for part in parts {
        let part = part.trim();
        if part.is_empty() || kept.contains(&part) {
            continue;
        }
        kept.push(part);
    }

    if kept.is_empty() {
        EMPTY_LABEL.to_string()
    } else {
        kept.join(LABEL_SEPARATOR)
    }
}
